pub mod document;
pub mod fetch;
pub mod inference;
pub mod patterns;
pub mod selectors;
pub mod seller;
pub mod seller_policy;
