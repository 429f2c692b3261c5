//! Wire shapes returned by the Black Duck REST API.
//!
//! Every field the aggregation reads is optional here; absent keys are
//! defaulted by the consumer instead of failing deserialization.

use serde::{Deserialize, Serialize};

/// Resource links carried by every upstream item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub href: String,
}

impl Meta {
    /// Last path segment of the resource href, which upstream uses as the ID.
    pub fn id(&self) -> &str {
        self.href.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    }
}

/// A paged collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub items: Option<Vec<T>>,
}

impl<T> Page<T> {
    pub fn of(items: Vec<T>) -> Self {
        Self { total_count: Some(items.len() as u64), items: Some(items) }
    }

    /// Items of a response that reports a positive `totalCount`. A response
    /// missing either key counts as empty.
    pub fn into_records(self) -> Vec<T> {
        match (self.total_count, self.items) {
            (Some(total), Some(items)) if total > 0 => items,
            _ => Vec::new(),
        }
    }

    /// Items regardless of `totalCount`.
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { total_count: None, items: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ProjectItem {
    pub fn id(&self) -> &str {
        self.meta.id()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionItem {
    #[serde(default)]
    pub version_name: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub distribution: Option<String>,
    #[serde(default)]
    pub last_scan_date: Option<String>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl VersionItem {
    pub fn id(&self) -> &str {
        self.meta.id()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetCountsPayload {
    #[serde(default)]
    pub snippet_scan_present: Option<bool>,
    #[serde(default)]
    pub unreviewed_count: u64,
    #[serde(default)]
    pub reviewed_count: u64,
    #[serde(default)]
    pub ignored_count: u64,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl SnippetCountsPayload {
    pub fn scan_present(&self) -> bool {
        self.snippet_scan_present.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityWithRemediation {
    #[serde(default)]
    pub remediation_status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerableComponentItem {
    #[serde(default)]
    pub vulnerability_with_remediation: Option<VulnerabilityWithRemediation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRuleItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub bom_violation_count: u64,
}

/// Child of a project group: either a nested group or a project link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupChild {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_project: Option<bool>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ProjectGroupChild {
    /// Only an explicit `isProject: false` marks a nested group.
    pub fn is_group(&self) -> bool {
        self.is_project == Some(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerToken {
    pub bearer_token: String,
    #[serde(default)]
    pub expires_in_milliseconds: Option<u64>,
}
