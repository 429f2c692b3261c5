use std::path::{Path, PathBuf};

use serde::Serialize;
use crate::config::ReportFormat;
use crate::errors::MetricsError;
use crate::models::InstanceRecord;
use super::csv_export::write_csv_file;
use super::formatter::format_html_report;
use super::metadata::ReportMetadata;
use tracing::info;

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    #[serde(flatten)]
    instance: &'a InstanceRecord,
}

/// Writes the requested report formats into `dir` and returns the written
/// paths. Formats listed twice are written once.
pub async fn write_reports(
    dir: &Path,
    formats: &[ReportFormat],
    instance: &InstanceRecord,
    metadata: &ReportMetadata,
) -> Result<Vec<PathBuf>, MetricsError> {
    tokio::fs::create_dir_all(dir).await?;

    let prefix = metadata.file_prefix();
    let mut written = Vec::new();
    let mut seen = Vec::new();

    for format in formats {
        if seen.contains(format) {
            continue;
        }
        seen.push(*format);

        let path = dir.join(format!("{}.{}", prefix, format.extension()));
        match format {
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(&JsonReport { metadata, instance })?;
                tokio::fs::write(&path, json).await?;
            }
            ReportFormat::Csv => {
                let rows = write_csv_file(&path, instance)
                    .map_err(|e| MetricsError::Report(format!("Failed to write {}: {}", path.display(), e)))?;
                info!(rows, "CSV rows written");
            }
            ReportFormat::Html => {
                tokio::fs::write(&path, format_html_report(instance, metadata)).await?;
            }
        }
        info!(path = %path.display(), format = format.extension(), "Report written");
        written.push(path);
    }

    Ok(written)
}
