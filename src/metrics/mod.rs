pub mod aggregator;
pub mod dormancy;
pub mod filter;
pub mod reconciler;
pub mod totals;

pub use aggregator::{collect_project, AggregationSettings};
pub use dormancy::Dormancy;
pub use filter::{filter_project, VersionFilter};
pub use reconciler::{reconcile_project, CacheState, Outcome};
pub use totals::merge_project_into_instance;
