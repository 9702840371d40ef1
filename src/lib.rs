pub mod core;
pub mod features;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::{AppState, ScoutError, ScoutResult};

// --- Flat module paths ---
pub use core::{config, region};
pub use features::{antibot, cache, widget};
pub use scraping::{inference, patterns, seller, seller_policy};
pub use tools::evaluate::evaluate;
pub use tools::page_host::{PageHost, StaticPage};
