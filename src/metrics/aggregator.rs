//! Fetch-path aggregation: walks a project's versions and counts every
//! snippet, policy violation and vulnerable component at version, project and
//! instance level in the same pass.

use crate::errors::MetricsError;
use crate::fetcher::MetricsSource;
use crate::models::upstream::{
    PolicyRuleItem, ProjectItem, SnippetCountsPayload, VersionItem, VulnerableComponentItem,
};
use crate::models::{
    InstanceRecord, PolicyCategory, PolicySeverity, ProjectRecord, RemediationStatus, Severity,
    VersionRecord, VersionViolation, MISSING,
};
use super::dormancy::Dormancy;
use super::filter::VersionFilter;
use tracing::debug;

/// Policy name used when upstream omits one.
pub const UNNAMED_POLICY: &str = "Unnamed Policy";

/// Inputs of a fetch-path aggregation that stay fixed for a whole run.
#[derive(Debug, Clone)]
pub struct AggregationSettings {
    pub filter: VersionFilter,
    pub dormancy: Dormancy,
}

impl AggregationSettings {
    pub fn new(filter: VersionFilter, since_days: i64) -> Self {
        Self { filter, dormancy: Dormancy::new(since_days) }
    }
}

/// The three records a fetched item is counted into.
pub struct Levels<'a> {
    pub version: &'a mut VersionRecord,
    pub project: &'a mut ProjectRecord,
    pub instance: &'a mut InstanceRecord,
}

impl Levels<'_> {
    /// Adds snippet review counts when the version has a snippet scan.
    pub fn apply_snippets(&mut self, payload: &SnippetCountsPayload) {
        if !payload.scan_present() {
            return;
        }
        let (u, r, i) = (payload.unreviewed_count, payload.reviewed_count, payload.ignored_count);
        self.version.snippets.record(u, r, i);
        self.project.snippets.record(u, r, i);
        self.instance.snippets.record(u, r, i);
    }

    /// Counts one policy rule hit and records it in the project and instance
    /// detail trees.
    pub fn apply_policy_violation(&mut self, item: &PolicyRuleItem) {
        let category = PolicyCategory::from_raw(item.category.as_deref());
        let severity = PolicySeverity::from_raw(item.severity.as_deref());
        let count = item.bom_violation_count;
        let name = item.name.as_deref().unwrap_or(UNNAMED_POLICY);

        self.version.policy_violations.record(category, severity, count);
        self.project.policy_violations.record(category, severity, count);
        self.instance.policy_violations.record(category, severity, count);

        let violation = VersionViolation {
            version_name: self.version.version_name.clone(),
            version_id: self.version.version_id.clone(),
            phase: self.version.phase.clone(),
            distribution: self.version.distribution.clone(),
            last_scan_date: self.version.last_scan_date.clone(),
            is_dormant: self.version.is_dormant,
            violation_count: count,
            severity,
        };
        let (project_id, project_name) = (self.project.project_id.clone(), self.project.project_name.clone());
        self.project
            .policy_details
            .record(category, name, &project_id, &project_name, violation.clone());
        self.instance
            .policy_details
            .record(category, name, &project_id, &project_name, violation);
    }

    /// Counts one vulnerable component. Items without remediation data are
    /// skipped; a missing status or severity counts as `NONE`.
    pub fn apply_vulnerable_component(&mut self, item: &VulnerableComponentItem) {
        let Some(vuln) = item.vulnerability_with_remediation.as_ref() else {
            return;
        };
        let status = RemediationStatus::from_raw(vuln.remediation_status.as_deref());
        let severity = Severity::from_raw(vuln.severity.as_deref());

        self.version.vulnerabilities.record(status, severity);
        self.project.vulnerabilities.record(status, severity);
        self.instance.vulnerabilities.record(status, severity);
    }
}

fn version_record(item: &VersionItem, dormancy: &Dormancy) -> VersionRecord {
    let mut record = VersionRecord::new(
        item.id(),
        item.version_name.as_deref().unwrap_or(MISSING),
        item.phase.as_deref().unwrap_or(MISSING),
        item.distribution.as_deref().unwrap_or(MISSING),
    );
    let scan = dormancy.evaluate(item.last_scan_date.as_deref());
    record.last_scan_date = scan.last_scan_date;
    record.is_dormant = scan.is_dormant;
    record
}

/// Fetches and counts every version of `item` into `project`, writing the same
/// increments through to `instance`.
///
/// An upstream error aborts the project; counts already written to the
/// instance stay in place.
pub async fn collect_project<S: MetricsSource + ?Sized>(
    source: &S,
    settings: &AggregationSettings,
    item: &ProjectItem,
    project: &mut ProjectRecord,
    instance: &mut InstanceRecord,
) -> Result<(), MetricsError> {
    let versions: Vec<VersionItem> = source
        .versions(item, &settings.filter)
        .await?
        .into_records()
        .into_iter()
        .filter(|v| {
            settings.filter.matches(
                v.version_name.as_deref().unwrap_or(MISSING),
                v.phase.as_deref().unwrap_or(MISSING),
                v.distribution.as_deref().unwrap_or(MISSING),
            )
        })
        .collect();

    let version_count = versions.len() as u64;
    project.project_version_count = version_count;
    instance.project_total_version_count += version_count;

    for version_item in &versions {
        let mut version = version_record(version_item, &settings.dormancy);
        version.project_version_count = version_count;
        project.mark_dormant(version.is_dormant);

        let snippets = source.snippet_counts(version_item).await?;
        let policies = source.policy_violations(version_item).await?.into_items();
        let components = source.vulnerable_components(version_item).await?.into_records();

        let mut levels = Levels { version: &mut version, project: &mut *project, instance: &mut *instance };
        levels.apply_snippets(&snippets);
        for policy in &policies {
            levels.apply_policy_violation(policy);
        }
        for component in &components {
            levels.apply_vulnerable_component(component);
        }

        if components.is_empty() {
            debug!(project = %project.project_name, version = %version.version_name, "No vulnerable components");
        }
        project.versions.push(version);
    }
    Ok(())
}
