pub mod evaluate;
pub mod page_host;
