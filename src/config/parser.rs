use std::path::Path;
use crate::errors::MetricsError;
use super::types::MetricsConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::{info, warn};

pub async fn parse_config(path: &Path) -> Result<MetricsConfig, MetricsError> {
    if !path.exists() {
        return Err(MetricsError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(MetricsError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parses and validates config text.
pub fn parse_config_str(content: &str) -> Result<MetricsConfig, MetricsError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(MetricsConfig::default());
    }

    // JSON Schema validation
    validate_schema(&yaml)?;

    let config: MetricsConfig = serde_yaml::from_value(yaml)?;

    // Semantic conflict detection
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
/// Violations are reported as warnings only.
pub fn validate_schema(yaml: &serde_yaml::Value) -> Result<Vec<String>, MetricsError> {
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| MetricsError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| MetricsError::Config(format!("Schema compilation error: {}", e)))?;

    let mut messages = Vec::new();
    if let Err(errors) = compiled.validate(&json_value) {
        messages = errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        for msg in &messages {
            warn!(validation_error = %msg, "Config schema warning");
        }
    }

    Ok(messages)
}

/// Detect semantic conflicts in the parsed configuration.
pub fn validate_conflicts(config: &MetricsConfig) -> Result<(), MetricsError> {
    if let Some(scope) = &config.scope {
        if scope.project.is_some() && scope.project_group.is_some() {
            return Err(MetricsError::Config(
                "scope.project and scope.project_group are mutually exclusive".into(),
            ));
        }
    }

    if let Some(filters) = &config.filters {
        if let Some(days) = filters.since_days {
            if days < 0 {
                return Err(MetricsError::Config(format!(
                    "filters.since_days must not be negative (got {})",
                    days
                )));
            }
        }
        if filters.phases.as_ref().is_some_and(|p| p.is_empty()) {
            warn!("filters.phases is empty and matches no version; omit it to disable the phase filter");
        }
        if filters.distributions.as_ref().is_some_and(|d| d.is_empty()) {
            warn!("filters.distributions is empty and matches no version; omit it to disable the distribution filter");
        }
    }

    if let Some(run) = &config.run {
        if run.reconnect_every == Some(0) {
            return Err(MetricsError::Config("run.reconnect_every must be at least 1".into()));
        }
    }

    if let Some(server) = &config.server {
        if server.timeout_secs == Some(0) {
            return Err(MetricsError::Config("server.timeout_secs must be at least 1".into()));
        }
        if server.token.as_deref().is_some_and(|t| !t.starts_with('$')) {
            warn!("server.token is stored in plain text; consider `token: $BD_TOKEN`");
        }
    }

    if let Some(cache) = &config.cache {
        if cache.truncate == Some(true) && cache.enabled == Some(false) {
            info!("cache.truncate empties the store even though cache.enabled is false");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FiltersConfig, ReportFormat, RunSettings, ScopeConfig};

    #[test]
    fn test_parse_full_config() {
        let config = parse_config_str(
            "server:\n  url: https://bd.example.com\n  token: $BD_TOKEN\n\
             filters:\n  phases: [RELEASED, development]\n  since_days: 14\n\
             cache:\n  enabled: true\n\
             output:\n  formats: [json, csv]\n",
        ).unwrap();
        assert_eq!(config.server.unwrap().url.as_deref(), Some("https://bd.example.com"));
        let filters = config.filters.unwrap();
        assert_eq!(filters.since_days, Some(14));
        assert_eq!(filters.phases.unwrap().len(), 2);
        assert_eq!(config.output.unwrap().formats, Some(vec![ReportFormat::Json, ReportFormat::Csv]));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config_str("").unwrap();
        assert!(config.server.is_none());
    }

    #[test]
    fn test_schema_reports_unknown_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("servr:\n  url: x\n").unwrap();
        assert!(!validate_schema(&yaml).unwrap().is_empty());
    }

    #[test]
    fn test_validate_conflicts_project_and_group() {
        let config = MetricsConfig {
            scope: Some(ScopeConfig {
                project: Some("app".into()),
                project_group: Some("team".into()),
                version: None,
            }),
            ..Default::default()
        };
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_validate_conflicts_negative_since_days() {
        let config = MetricsConfig {
            filters: Some(FiltersConfig { since_days: Some(-1), ..Default::default() }),
            ..Default::default()
        };
        assert!(matches!(validate_conflicts(&config), Err(MetricsError::Config(_))));
    }

    #[test]
    fn test_validate_conflicts_zero_reconnect() {
        let config = MetricsConfig {
            run: Some(RunSettings { reconnect_every: Some(0) }),
            ..Default::default()
        };
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_validate_conflicts_empty_config() {
        assert!(validate_conflicts(&MetricsConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_parse_config_missing_file() {
        let result = parse_config(Path::new("/nonexistent/bdmetrics.yaml")).await;
        assert!(matches!(result, Err(MetricsError::Config(_))));
    }
}
