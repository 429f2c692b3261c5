use serde::{Deserialize, Serialize};
use tracing::warn;

/// Triage status of a vulnerable component as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemediationStatus {
    New,
    Ignored,
    Duplicate,
    Mitigated,
    NeedsReview,
    Patched,
    RemediationComplete,
    RemediationRequired,
    NotAffected,
    Affected,
    UnderInvestigation,
    None,
}

impl RemediationStatus {
    pub const ALL: [RemediationStatus; 12] = [
        RemediationStatus::New,
        RemediationStatus::Ignored,
        RemediationStatus::Duplicate,
        RemediationStatus::Mitigated,
        RemediationStatus::NeedsReview,
        RemediationStatus::Patched,
        RemediationStatus::RemediationComplete,
        RemediationStatus::RemediationRequired,
        RemediationStatus::NotAffected,
        RemediationStatus::Affected,
        RemediationStatus::UnderInvestigation,
        RemediationStatus::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ignored => "IGNORED",
            Self::Duplicate => "DUPLICATE",
            Self::Mitigated => "MITIGATED",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Patched => "PATCHED",
            Self::RemediationComplete => "REMEDIATION_COMPLETE",
            Self::RemediationRequired => "REMEDIATION_REQUIRED",
            Self::NotAffected => "NOT_AFFECTED",
            Self::Affected => "AFFECTED",
            Self::UnderInvestigation => "UNDER_INVESTIGATION",
            Self::None => "NONE",
        }
    }

    /// Maps a raw upstream value onto the taxonomy. Absent and unrecognised
    /// values both land on `None`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Self::None };
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == upper)
            .unwrap_or_else(|| {
                warn!(value = raw, "Unknown remediation status, counting as NONE");
                Self::None
            })
    }
}

/// Vulnerability severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    None,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Self::None };
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == upper)
            .unwrap_or_else(|| {
                warn!(value = raw, "Unknown severity, counting as NONE");
                Self::None
            })
    }
}

/// Policy rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyCategory {
    Uncategorized,
    Component,
    License,
    Operational,
    Security,
}

impl PolicyCategory {
    pub const ALL: [PolicyCategory; 5] = [
        PolicyCategory::Uncategorized,
        PolicyCategory::Component,
        PolicyCategory::License,
        PolicyCategory::Operational,
        PolicyCategory::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uncategorized => "UNCATEGORIZED",
            Self::Component => "COMPONENT",
            Self::License => "LICENSE",
            Self::Operational => "OPERATIONAL",
            Self::Security => "SECURITY",
        }
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Self::Uncategorized };
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .unwrap_or_else(|| {
                warn!(value = raw, "Unknown policy category, counting as UNCATEGORIZED");
                Self::Uncategorized
            })
    }
}

/// Policy rule severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicySeverity {
    Blocker,
    Critical,
    Major,
    Minor,
    Trivial,
    Unspecified,
}

impl PolicySeverity {
    pub const ALL: [PolicySeverity; 6] = [
        PolicySeverity::Blocker,
        PolicySeverity::Critical,
        PolicySeverity::Major,
        PolicySeverity::Minor,
        PolicySeverity::Trivial,
        PolicySeverity::Unspecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Trivial => "TRIVIAL",
            Self::Unspecified => "UNSPECIFIED",
        }
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Self::Unspecified };
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == upper)
            .unwrap_or_else(|| {
                warn!(value = raw, "Unknown policy severity, counting as UNSPECIFIED");
                Self::Unspecified
            })
    }
}

impl std::fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for PolicySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_use_defaults() {
        assert_eq!(RemediationStatus::from_raw(None), RemediationStatus::None);
        assert_eq!(Severity::from_raw(None), Severity::None);
        assert_eq!(PolicyCategory::from_raw(None), PolicyCategory::Uncategorized);
        assert_eq!(PolicySeverity::from_raw(None), PolicySeverity::Unspecified);
    }

    #[test]
    fn test_known_values_map() {
        assert_eq!(RemediationStatus::from_raw(Some("NOT_AFFECTED")), RemediationStatus::NotAffected);
        assert_eq!(RemediationStatus::from_raw(Some("under_investigation")), RemediationStatus::UnderInvestigation);
        assert_eq!(Severity::from_raw(Some("CRITICAL")), Severity::Critical);
        assert_eq!(PolicyCategory::from_raw(Some("LICENSE")), PolicyCategory::License);
        assert_eq!(PolicySeverity::from_raw(Some("MAJOR")), PolicySeverity::Major);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        assert_eq!(RemediationStatus::from_raw(Some("WONT_FIX")), RemediationStatus::None);
        assert_eq!(Severity::from_raw(Some("INFO")), Severity::None);
        assert_eq!(PolicyCategory::from_raw(Some("QUALITY")), PolicyCategory::Uncategorized);
        assert_eq!(PolicySeverity::from_raw(Some("")), PolicySeverity::Unspecified);
    }

    #[test]
    fn test_serde_names_match_upstream() {
        let json = serde_json::to_string(&RemediationStatus::RemediationRequired).unwrap();
        assert_eq!(json, "\"REMEDIATION_REQUIRED\"");
        let parsed: PolicyCategory = serde_json::from_str("\"OPERATIONAL\"").unwrap();
        assert_eq!(parsed, PolicyCategory::Operational);
    }

    #[test]
    fn test_as_str_round_trips_through_from_raw() {
        for status in RemediationStatus::ALL {
            assert_eq!(RemediationStatus::from_raw(Some(status.as_str())), status);
        }
        for severity in PolicySeverity::ALL {
            assert_eq!(PolicySeverity::from_raw(Some(severity.as_str())), severity);
        }
    }
}
