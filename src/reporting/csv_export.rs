use std::io::Write;
use std::path::Path;

use crate::errors::MetricsError;
use crate::models::{InstanceRecord, PolicyCategory, RemediationStatus};

fn header() -> Vec<String> {
    let mut columns: Vec<String> = [
        "project", "project_id", "version", "version_id", "phase", "distribution",
        "last_scan_date", "dormant", "total",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    columns.extend(RemediationStatus::ALL.iter().map(|s| s.as_str().to_string()));
    columns.extend(PolicyCategory::ALL.iter().map(|c| format!("POLICY_{}", c.as_str())));
    columns.extend(["snippets_unreviewed", "snippets_reviewed", "snippets_ignored"].map(String::from));
    columns
}

/// Writes one row per project version.
pub fn write_csv<W: Write>(writer: W, instance: &InstanceRecord) -> Result<usize, MetricsError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())?;

    let mut rows = 0;
    for project in &instance.projects {
        for version in &project.versions {
            let mut record = vec![
                project.project_name.clone(),
                project.project_id.clone(),
                version.version_name.clone(),
                version.version_id.clone(),
                version.phase.clone(),
                version.distribution.clone(),
                version.last_scan_date.clone(),
                version.is_dormant.to_string(),
                version.vulnerabilities.total.to_string(),
            ];
            record.extend(
                RemediationStatus::ALL
                    .iter()
                    .map(|s| version.vulnerabilities.status(*s).total.to_string()),
            );
            record.extend(
                PolicyCategory::ALL
                    .iter()
                    .map(|c| version.policy_violations.category(*c).total.to_string()),
            );
            record.push(version.snippets.unreviewed.to_string());
            record.push(version.snippets.reviewed.to_string());
            record.push(version.snippets.ignored.to_string());
            wtr.write_record(&record)?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

pub fn write_csv_file(path: &Path, instance: &InstanceRecord) -> Result<usize, MetricsError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, instance)
}
