use chrono::{DateTime, Local};
use serde::Serialize;
use crate::pipeline::RunConfig;

const REPORT_TIME_FORMAT: &str = "%B %d, %Y %H:%M:%S";
const FILE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Run context written next to the metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub url: String,
    pub report_time: String,
    pub scope: String,
    pub version: Option<String>,
    pub phases: Option<Vec<String>>,
    pub distributions: Option<Vec<String>>,
    pub since_days: i64,
    pub generator: String,
    #[serde(skip)]
    pub file_stamp: String,
}

impl ReportMetadata {
    pub fn from_run(config: &RunConfig, now: DateTime<Local>) -> Self {
        Self {
            url: config.server.url.clone(),
            report_time: now.format(REPORT_TIME_FORMAT).to_string(),
            scope: config.scope.to_string(),
            version: config.filter.version_name.clone(),
            phases: config.filter.phases.clone(),
            distributions: config.filter.distributions.clone(),
            since_days: config.since_days,
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            file_stamp: now.format(FILE_TIME_FORMAT).to_string(),
        }
    }

    /// Common file name prefix of every report of a run.
    pub fn file_prefix(&self) -> String {
        format!("triageReport_bd_{}", self.file_stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::fetcher::ServerSettings;

    #[test]
    fn test_file_prefix_uses_timestamp() {
        let config = RunConfig::new(ServerSettings {
            url: "https://bd.example.com".into(),
            token: "t".into(),
            insecure: false,
            timeout_secs: 30,
        });
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let metadata = ReportMetadata::from_run(&config, now);
        assert_eq!(metadata.file_prefix(), "triageReport_bd_20240307090501");
        assert_eq!(metadata.scope, "all projects");
        assert_eq!(metadata.report_time, "March 07, 2024 09:05:01");
    }
}
