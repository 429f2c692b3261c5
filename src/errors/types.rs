use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MetricsError {
    /// Process exit code used by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MetricsError::Config(_) | MetricsError::Yaml(_) => 2,
            MetricsError::Network(_) | MetricsError::Upstream { .. } => 3,
            MetricsError::Authentication(_) => 4,
            MetricsError::Cache(_) => 5,
            _ => 1,
        }
    }
}
