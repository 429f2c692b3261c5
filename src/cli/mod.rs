pub mod commands;
pub mod report;
pub mod cache;
pub mod validate;
pub mod output;

pub use commands::{Cli, Commands};
