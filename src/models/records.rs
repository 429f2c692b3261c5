use serde::{Deserialize, Serialize};
use super::counts::{PolicyViolationCounts, SnippetCounts, VulnerabilityCounts};
use super::policy::{PolicyBreakdown, PolicyDetails};

/// Placeholder used for absent dates, phases and names.
pub const MISSING: &str = "-";

/// Metrics of one project version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub version_name: String,
    pub phase: String,
    pub distribution: String,
    /// Formatted scan date, or `-` when the version was never scanned.
    pub last_scan_date: String,
    pub is_dormant: bool,
    #[serde(rename = "vulnerableComponentCountsByRemediationStatus")]
    pub vulnerabilities: VulnerabilityCounts,
    pub policy_violations: PolicyViolationCounts,
    pub snippets: SnippetCounts,
    /// Number of versions the owning project had when this one was collected.
    pub project_version_count: u64,
}

impl VersionRecord {
    pub fn new(version_id: &str, version_name: &str, phase: &str, distribution: &str) -> Self {
        Self {
            version_id: version_id.to_string(),
            version_name: version_name.to_string(),
            phase: phase.to_string(),
            distribution: distribution.to_string(),
            last_scan_date: MISSING.to_string(),
            is_dormant: false,
            vulnerabilities: VulnerabilityCounts::new(),
            policy_violations: PolicyViolationCounts::new(),
            snippets: SnippetCounts::default(),
            project_version_count: 0,
        }
    }
}

/// Metrics of one project, summed over its versions. This is the unit
/// persisted in the cache.
///
/// Remediation status bundles serialize at the top level of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub project_name: String,
    /// Upstream `updatedAt`, compared verbatim to detect stale cache entries.
    pub updated_at: String,
    #[serde(flatten)]
    pub vulnerabilities: VulnerabilityCounts,
    pub policy_violations: PolicyViolationCounts,
    #[serde(rename = "SNIPPET")]
    pub snippets: SnippetCounts,
    pub is_dormant: bool,
    pub policy_details: PolicyDetails,
    pub project_version_count: u64,
    #[serde(rename = "projectVersionLevelCounts")]
    pub versions: Vec<VersionRecord>,
}

impl ProjectRecord {
    pub fn new(project_id: &str, project_name: &str, updated_at: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            project_name: project_name.to_string(),
            updated_at: updated_at.to_string(),
            vulnerabilities: VulnerabilityCounts::new(),
            policy_violations: PolicyViolationCounts::new(),
            snippets: SnippetCounts::default(),
            is_dormant: false,
            policy_details: PolicyDetails::new(),
            project_version_count: 0,
            versions: Vec::new(),
        }
    }

    /// Sets the dormant flag. Once set it stays set.
    pub fn mark_dormant(&mut self, dormant: bool) {
        self.is_dormant = self.is_dormant || dormant;
    }
}

/// Root of a run: totals over every project visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    #[serde(flatten)]
    pub vulnerabilities: VulnerabilityCounts,
    pub policy_violations: PolicyViolationCounts,
    #[serde(rename = "SNIPPET")]
    pub snippets: SnippetCounts,
    #[serde(rename = "ProjectTotalCount")]
    pub project_total_count: u64,
    #[serde(rename = "ProjectTotalVersionCount")]
    pub project_total_version_count: u64,
    pub policy_details: PolicyDetails,
    pub policy_breakdown: PolicyBreakdown,
    pub projects: Vec<ProjectRecord>,
}

impl InstanceRecord {
    pub fn new(project_total_count: u64) -> Self {
        Self {
            vulnerabilities: VulnerabilityCounts::new(),
            policy_violations: PolicyViolationCounts::new(),
            snippets: SnippetCounts::default(),
            project_total_count,
            project_total_version_count: 0,
            policy_details: PolicyDetails::new(),
            policy_breakdown: PolicyBreakdown::new(),
            projects: Vec::new(),
        }
    }

    /// Derives the display breakdown from the final detail tree.
    pub fn finalize(&mut self) {
        self.policy_breakdown = self.policy_details.breakdown();
    }

    pub fn dormant_project_count(&self) -> usize {
        self.projects.iter().filter(|p| p.is_dormant).count()
    }
}
