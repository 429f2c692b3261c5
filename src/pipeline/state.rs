use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use crate::config::ReportFormat;
use crate::fetcher::{ProjectScope, ServerSettings};
use crate::metrics::{Outcome, VersionFilter};
use crate::models::InstanceRecord;

pub const DEFAULT_SINCE_DAYS: i64 = 30;
pub const DEFAULT_RECONNECT_EVERY: usize = 200;
pub const DEFAULT_DB_FILE: &str = "bd_remediation_db.sqlite";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub db_file: PathBuf,
    /// Reuse and update cached projects during the run. When false the store
    /// is only opened to be truncated.
    pub enabled: bool,
    /// Empty the cache before the run.
    pub truncate: bool,
}

/// Fully resolved settings of one aggregation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub server: ServerSettings,
    pub scope: ProjectScope,
    pub filter: VersionFilter,
    pub since_days: i64,
    /// `None` disables the cache.
    pub cache: Option<CacheSettings>,
    pub output_dir: PathBuf,
    pub formats: Vec<ReportFormat>,
    pub reconnect_every: usize,
}

impl RunConfig {
    /// Run settings for the given server with every other option at its
    /// default.
    pub fn new(server: ServerSettings) -> Self {
        Self {
            server,
            scope: ProjectScope::All,
            filter: VersionFilter::default(),
            since_days: DEFAULT_SINCE_DAYS,
            cache: None,
            output_dir: PathBuf::from("."),
            formats: Vec::new(),
            reconnect_every: DEFAULT_RECONNECT_EVERY,
        }
    }
}

/// Per-outcome project counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub computed: usize,
    pub inserted: usize,
    pub refreshed: usize,
    pub reused: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Computed => self.computed += 1,
            Outcome::Inserted => self.inserted += 1,
            Outcome::Refreshed => self.refreshed += 1,
            Outcome::Reused => self.reused += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.computed + self.inserted + self.refreshed + self.reused
    }
}

/// Result of a run that found at least one project.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub instance: InstanceRecord,
    pub tally: OutcomeTally,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn average_per_project(&self) -> Duration {
        match self.instance.project_total_count {
            0 => Duration::ZERO,
            n => self.elapsed / n as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_each_outcome() {
        let mut tally = OutcomeTally::default();
        tally.record(Outcome::Inserted);
        tally.record(Outcome::Reused);
        tally.record(Outcome::Reused);
        assert_eq!(tally.reused, 2);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_average_per_project() {
        let summary = RunSummary {
            instance: InstanceRecord::new(4),
            tally: OutcomeTally::default(),
            elapsed: Duration::from_secs(8),
        };
        assert_eq!(summary.average_per_project(), Duration::from_secs(2));
    }
}
