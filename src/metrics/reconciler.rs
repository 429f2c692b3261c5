//! Per-project decision between recomputing and reusing a cached record.

use crate::db::Database;
use crate::errors::MetricsError;
use crate::fetcher::MetricsSource;
use crate::models::upstream::ProjectItem;
use crate::models::{InstanceRecord, ProjectRecord};
use super::aggregator::{collect_project, AggregationSettings};
use super::filter::filter_project;
use super::totals::merge_project_into_instance;
use tracing::debug;

/// Cache state of a project relative to its upstream `updatedAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// No cache entry.
    Unseen,
    /// Cached under a different `updatedAt`.
    Stale(ProjectRecord),
    /// Cached under the same `updatedAt`.
    Fresh(ProjectRecord),
}

impl CacheState {
    pub fn decide(cached: Option<ProjectRecord>, upstream: &ProjectItem) -> Self {
        match cached {
            None => Self::Unseen,
            Some(record) if record.updated_at != upstream.updated_at => Self::Stale(record),
            Some(record) => Self::Fresh(record),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Stale(_) => "stale",
            Self::Fresh(_) => "fresh",
        }
    }
}

/// How a project's record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Computed,
    Inserted,
    Refreshed,
    Reused,
}

async fn compute<S: MetricsSource + ?Sized>(
    source: &S,
    settings: &AggregationSettings,
    item: &ProjectItem,
    project_id: &str,
    instance: &mut InstanceRecord,
) -> Result<ProjectRecord, MetricsError> {
    let mut project = ProjectRecord::new(project_id, &item.name, &item.updated_at);
    collect_project(source, settings, item, &mut project, instance).await?;
    Ok(project)
}

/// Produces the record reported for `item` and accounts for it in `instance`.
///
/// Without a cache the project is always computed. With a cache an unseen
/// project is computed and inserted, a stale one is recomputed from zero and
/// upserted under its cached ID, and a fresh one is re-filtered with the
/// current version filter before being merged into the instance totals.
pub async fn reconcile_project<S: MetricsSource + ?Sized>(
    source: &S,
    cache: Option<&Database>,
    settings: &AggregationSettings,
    item: &ProjectItem,
    instance: &mut InstanceRecord,
) -> Result<(ProjectRecord, Outcome), MetricsError> {
    let project_id = item.id().to_string();

    let Some(db) = cache else {
        let project = compute(source, settings, item, &project_id, instance).await?;
        return Ok((project, Outcome::Computed));
    };

    let state = CacheState::decide(db.get_project(&project_id)?, item);
    debug!(project = %item.name, state = state.label(), "Cache lookup");

    match state {
        CacheState::Unseen => {
            let project = compute(source, settings, item, &project_id, instance).await?;
            db.insert_project(&project)?;
            Ok((project, Outcome::Inserted))
        }
        CacheState::Stale(cached) => {
            let project = compute(source, settings, item, &cached.project_id, instance).await?;
            db.upsert_project(&project)?;
            Ok((project, Outcome::Refreshed))
        }
        CacheState::Fresh(cached) => {
            let project = filter_project(&cached, &settings.filter);
            merge_project_into_instance(&project, instance);
            Ok((project, Outcome::Reused))
        }
    }
}
