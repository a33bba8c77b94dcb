pub mod aggregator;
pub mod cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod render;
pub mod teamcity;
