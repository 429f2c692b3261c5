pub mod orchestrator;
pub mod state;

pub use orchestrator::{open_cache, prepare_cache, RunOrchestrator};
pub use state::{CacheSettings, OutcomeTally, RunConfig, RunSummary};
