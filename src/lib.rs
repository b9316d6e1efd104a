pub mod alert;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod event;
pub mod executor;
pub mod image;
pub mod models;
pub mod report;
pub mod store;
pub mod utils;
