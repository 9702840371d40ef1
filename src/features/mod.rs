pub mod antibot;
pub mod cache;
pub mod widget;
