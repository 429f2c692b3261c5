pub mod connection;
pub mod projects;
pub mod schema;

pub use connection::Database;
pub use projects::CachedProjectSummary;
