pub mod blackduck;
pub mod groups;
pub mod source;

pub use blackduck::{BlackDuckClient, ServerSettings};
pub use source::{MetricsSource, ProjectScope};
