pub mod api;
pub mod fixtures;
pub mod models;
