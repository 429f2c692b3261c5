pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod fetcher;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod reporting;
pub mod utils;
