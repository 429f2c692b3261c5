use serde::{Deserialize, Serialize};

/// Optional YAML run configuration. Every field can also be given on the
/// command line, which takes precedence.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MetricsConfig {
    pub server: Option<ServerConfig>,
    pub scope: Option<ScopeConfig>,
    pub filters: Option<FiltersConfig>,
    pub cache: Option<CacheConfig>,
    pub output: Option<OutputConfig>,
    pub run: Option<RunSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub url: Option<String>,
    /// API token, or `$VAR` to read it from the environment.
    pub token: Option<String>,
    pub insecure: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScopeConfig {
    pub project: Option<String>,
    pub project_group: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FiltersConfig {
    pub phases: Option<Vec<String>>,
    pub distributions: Option<Vec<String>>,
    pub since_days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub db_file: Option<String>,
    pub truncate: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub formats: Option<Vec<ReportFormat>>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RunSettings {
    pub reconnect_every: Option<usize>,
}
