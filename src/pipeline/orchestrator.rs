use std::time::Instant;

use crate::db::Database;
use crate::errors::MetricsError;
use crate::fetcher::MetricsSource;
use crate::metrics::{reconcile_project, AggregationSettings};
use crate::models::upstream::ProjectItem;
use crate::models::InstanceRecord;
use crate::progress::RunProgress;
use super::state::{CacheSettings, OutcomeTally, RunConfig, RunSummary};
use tracing::{info, warn};

/// Opens the cache store of a run, emptying it first when requested.
pub fn open_cache(settings: &CacheSettings) -> Result<Database, MetricsError> {
    let db = Database::new(&settings.db_file.to_string_lossy())?;
    if settings.truncate {
        let removed = db.truncate()?;
        info!(removed, db_file = %settings.db_file.display(), "Truncated project cache");
    }
    Ok(db)
}

/// Applies the cache settings of a run and returns the store the run should
/// use, if any. A truncate-only request empties the store and closes it.
pub fn prepare_cache(settings: &CacheSettings) -> Result<Option<Database>, MetricsError> {
    let db = open_cache(settings)?;
    if settings.enabled {
        return Ok(Some(db));
    }
    db.close()?;
    Ok(None)
}

/// Drives one aggregation run: resolves the project list, reconciles every
/// project in order and assembles the instance record.
pub struct RunOrchestrator<S: MetricsSource> {
    config: RunConfig,
    source: S,
    cache: Option<Database>,
    show_progress: bool,
}

impl<S: MetricsSource> RunOrchestrator<S> {
    pub fn new(config: RunConfig, source: S, cache: Option<Database>) -> Self {
        Self { config, source, cache, show_progress: false }
    }

    pub fn with_progress(mut self, visible: bool) -> Self {
        self.show_progress = visible;
        self
    }

    /// Runs to completion. `Ok(None)` means the scope matched no project.
    ///
    /// The cache is closed on every exit path; a run error takes precedence
    /// over a close error.
    pub async fn run(mut self) -> Result<Option<RunSummary>, MetricsError> {
        let started = Instant::now();
        let result = self.collect().await;

        let closed = match self.cache.take() {
            Some(db) => db.close(),
            None => Ok(()),
        };

        let collected = result?;
        closed?;

        Ok(collected.map(|(instance, tally)| RunSummary { instance, tally, elapsed: started.elapsed() }))
    }

    async fn collect(&mut self) -> Result<Option<(InstanceRecord, OutcomeTally)>, MetricsError> {
        info!(
            source = self.source.source_name(),
            scope = %self.config.scope,
            filter = ?self.config.filter,
            since_days = self.config.since_days,
            cache = self.cache.is_some(),
            "Run started"
        );

        let projects = self.source.projects(&self.config.scope).await?;
        if projects.is_empty() {
            warn!(scope = %self.config.scope, "No projects found");
            return Ok(None);
        }

        let progress = RunProgress::new(projects.len() as u64, self.show_progress);
        progress.println(&format!("Total project count: {}", projects.len()));
        progress.println("Analyzing found projects...");

        let mut instance = InstanceRecord::new(projects.len() as u64);
        let mut tally = OutcomeTally::default();

        match self.visit_projects(&projects, &mut instance, &mut tally, &progress).await {
            Ok(()) => progress.finish(),
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }

        instance.finalize();
        info!(
            projects = instance.project_total_count,
            versions = instance.project_total_version_count,
            vulnerable_components = instance.vulnerabilities.total,
            policy_violations = instance.policy_violations.total(),
            computed = tally.computed + tally.inserted + tally.refreshed,
            reused = tally.reused,
            "Run finished"
        );
        Ok(Some((instance, tally)))
    }

    async fn visit_projects(
        &mut self,
        projects: &[ProjectItem],
        instance: &mut InstanceRecord,
        tally: &mut OutcomeTally,
        progress: &RunProgress,
    ) -> Result<(), MetricsError> {
        let settings = AggregationSettings::new(self.config.filter.clone(), self.config.since_days);
        let reconnect_every = self.config.reconnect_every.max(1);

        for (index, item) in projects.iter().enumerate() {
            if index > 0 && index % reconnect_every == 0 {
                self.source.reconnect().await?;
            }
            progress.set_project(&item.name);

            let (project, outcome) =
                reconcile_project(&self.source, self.cache.as_ref(), &settings, item, instance).await?;
            tally.record(outcome);
            instance.projects.push(project);
            progress.inc();
        }
        Ok(())
    }
}
