pub mod app_state;
pub mod config;
pub mod error;
pub mod region;
pub mod types;
pub mod wait;

pub use app_state::AppState;
pub use error::{ScoutError, ScoutResult};
