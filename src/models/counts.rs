use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::taxonomy::{PolicyCategory, PolicySeverity, RemediationStatus, Severity};

/// Vulnerable component counts for a single remediation status.
/// `total` always equals the sum of the five severity slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub none: u64,
    #[serde(rename = "Total")]
    pub total: u64,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::None => self.none,
        }
    }

    fn slot_mut(&mut self, severity: Severity) -> &mut u64 {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::None => &mut self.none,
        }
    }

    pub fn record(&mut self, severity: Severity, count: u64) {
        *self.slot_mut(severity) += count;
        self.total += count;
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        for severity in Severity::ALL {
            self.record(severity, other.get(severity));
        }
    }

    pub fn severity_sum(&self) -> u64 {
        Severity::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Counter bundle: vulnerable components keyed by remediation status, then
/// severity. Every status is present from construction.
///
/// Serializes as `{"Total": n, "NEW": {...}, "PATCHED": {...}, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityCounts {
    #[serde(rename = "Total")]
    pub total: u64,
    #[serde(flatten)]
    pub by_status: BTreeMap<RemediationStatus, SeverityCounts>,
}

impl VulnerabilityCounts {
    pub fn new() -> Self {
        Self {
            total: 0,
            by_status: RemediationStatus::ALL
                .into_iter()
                .map(|status| (status, SeverityCounts::default()))
                .collect(),
        }
    }

    /// Counts one vulnerable component.
    pub fn record(&mut self, status: RemediationStatus, severity: Severity) {
        self.by_status.entry(status).or_default().record(severity, 1);
        self.total += 1;
    }

    pub fn status(&self, status: RemediationStatus) -> SeverityCounts {
        self.by_status.get(&status).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &VulnerabilityCounts) {
        for (status, counts) in &other.by_status {
            self.by_status.entry(*status).or_default().merge(counts);
        }
        self.total += other.total;
    }

    pub fn status_sum(&self) -> u64 {
        self.by_status.values().map(|c| c.total).sum()
    }
}

impl Default for VulnerabilityCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Policy violation counts for a single category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PolicySeverityCounts {
    pub blocker: u64,
    pub critical: u64,
    pub major: u64,
    pub minor: u64,
    pub trivial: u64,
    pub unspecified: u64,
    #[serde(rename = "Total")]
    pub total: u64,
}

impl PolicySeverityCounts {
    pub fn get(&self, severity: PolicySeverity) -> u64 {
        match severity {
            PolicySeverity::Blocker => self.blocker,
            PolicySeverity::Critical => self.critical,
            PolicySeverity::Major => self.major,
            PolicySeverity::Minor => self.minor,
            PolicySeverity::Trivial => self.trivial,
            PolicySeverity::Unspecified => self.unspecified,
        }
    }

    fn slot_mut(&mut self, severity: PolicySeverity) -> &mut u64 {
        match severity {
            PolicySeverity::Blocker => &mut self.blocker,
            PolicySeverity::Critical => &mut self.critical,
            PolicySeverity::Major => &mut self.major,
            PolicySeverity::Minor => &mut self.minor,
            PolicySeverity::Trivial => &mut self.trivial,
            PolicySeverity::Unspecified => &mut self.unspecified,
        }
    }

    pub fn record(&mut self, severity: PolicySeverity, count: u64) {
        *self.slot_mut(severity) += count;
        self.total += count;
    }

    pub fn merge(&mut self, other: &PolicySeverityCounts) {
        for severity in PolicySeverity::ALL {
            self.record(severity, other.get(severity));
        }
    }

    pub fn severity_sum(&self) -> u64 {
        PolicySeverity::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Policy violation bundle keyed by category, then policy severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyViolationCounts {
    pub by_category: BTreeMap<PolicyCategory, PolicySeverityCounts>,
}

impl PolicyViolationCounts {
    pub fn new() -> Self {
        Self {
            by_category: PolicyCategory::ALL
                .into_iter()
                .map(|category| (category, PolicySeverityCounts::default()))
                .collect(),
        }
    }

    pub fn record(&mut self, category: PolicyCategory, severity: PolicySeverity, count: u64) {
        self.by_category.entry(category).or_default().record(severity, count);
    }

    pub fn category(&self, category: PolicyCategory) -> PolicySeverityCounts {
        self.by_category.get(&category).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &PolicyViolationCounts) {
        for (category, counts) in &other.by_category {
            self.by_category.entry(*category).or_default().merge(counts);
        }
    }

    pub fn total(&self) -> u64 {
        self.by_category.values().map(|c| c.total).sum()
    }
}

impl Default for PolicyViolationCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Snippet match review counts. `total` is the sum of the three states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetCounts {
    pub unreviewed: u64,
    pub reviewed: u64,
    pub ignored: u64,
    #[serde(rename = "Total")]
    pub total: u64,
}

impl SnippetCounts {
    pub fn record(&mut self, unreviewed: u64, reviewed: u64, ignored: u64) {
        self.unreviewed += unreviewed;
        self.reviewed += reviewed;
        self.ignored += ignored;
        self.total += unreviewed + reviewed + ignored;
    }

    pub fn merge(&mut self, other: &SnippetCounts) {
        self.record(other.unreviewed, other.reviewed, other.ignored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bundle_has_every_status_zeroed() {
        let counts = VulnerabilityCounts::new();
        assert_eq!(counts.by_status.len(), RemediationStatus::ALL.len());
        assert_eq!(counts.total, 0);
        assert!(counts.by_status.values().all(|c| *c == SeverityCounts::default()));
    }

    #[test]
    fn test_record_keeps_sum_invariant() {
        let mut counts = VulnerabilityCounts::new();
        counts.record(RemediationStatus::New, Severity::Critical);
        counts.record(RemediationStatus::New, Severity::Low);
        counts.record(RemediationStatus::Patched, Severity::None);

        let new = counts.status(RemediationStatus::New);
        assert_eq!(new.critical, 1);
        assert_eq!(new.low, 1);
        assert_eq!(new.total, new.severity_sum());
        assert_eq!(counts.total, 3);
        assert_eq!(counts.total, counts.status_sum());
    }

    #[test]
    fn test_merge_adds_every_slot() {
        let mut a = VulnerabilityCounts::new();
        a.record(RemediationStatus::Affected, Severity::High);
        let mut b = VulnerabilityCounts::new();
        b.record(RemediationStatus::Affected, Severity::High);
        b.record(RemediationStatus::Ignored, Severity::Medium);

        a.merge(&b);
        assert_eq!(a.status(RemediationStatus::Affected).high, 2);
        assert_eq!(a.status(RemediationStatus::Ignored).medium, 1);
        assert_eq!(a.total, 3);
        assert_eq!(a.total, a.status_sum());
    }

    #[test]
    fn test_policy_counts_record_by_violation_count() {
        let mut counts = PolicyViolationCounts::new();
        counts.record(PolicyCategory::License, PolicySeverity::Major, 4);
        counts.record(PolicyCategory::License, PolicySeverity::Blocker, 1);
        counts.record(PolicyCategory::Security, PolicySeverity::Critical, 2);

        let license = counts.category(PolicyCategory::License);
        assert_eq!(license.major, 4);
        assert_eq!(license.blocker, 1);
        assert_eq!(license.total, 5);
        assert_eq!(license.total, license.severity_sum());
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.by_category.len(), PolicyCategory::ALL.len());
    }

    #[test]
    fn test_snippet_total_is_sum_of_states() {
        let mut snippets = SnippetCounts::default();
        snippets.record(3, 2, 1);
        snippets.merge(&SnippetCounts { unreviewed: 1, reviewed: 0, ignored: 0, total: 1 });
        assert_eq!(snippets.total, 7);
        assert_eq!(snippets.total, snippets.unreviewed + snippets.reviewed + snippets.ignored);
    }

    #[test]
    fn test_bundle_serializes_status_keys() {
        let mut counts = VulnerabilityCounts::new();
        counts.record(RemediationStatus::NeedsReview, Severity::High);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["NEEDS_REVIEW"]["HIGH"], 1);
        assert_eq!(json["NEEDS_REVIEW"]["Total"], 1);
        assert_eq!(json["Total"], 1);

        let back: VulnerabilityCounts = serde_json::from_value(json).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn test_policy_bundle_keyed_by_category() {
        let mut counts = PolicyViolationCounts::new();
        counts.record(PolicyCategory::License, PolicySeverity::Blocker, 2);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["LICENSE"]["BLOCKER"], 2);
        assert_eq!(json["LICENSE"]["Total"], 2);
        assert_eq!(json["SECURITY"]["Total"], 0);
    }
}
