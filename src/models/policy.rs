use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::taxonomy::{PolicyCategory, PolicySeverity};

/// One version's contribution to a policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionViolation {
    pub version_name: String,
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub phase: String,
    pub distribution: String,
    pub last_scan_date: String,
    pub is_dormant: bool,
    pub violation_count: u64,
    pub severity: PolicySeverity,
}

/// Versions of one project that violate a policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyProjectEntry {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub project_name: String,
    pub versions: Vec<VersionViolation>,
}

/// A single policy rule node of the detail tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyNode {
    pub severity: PolicySeverity,
    pub total_count: u64,
    /// Keyed by project ID.
    pub projects: BTreeMap<String, PolicyProjectEntry>,
}

impl PolicyNode {
    fn new(severity: PolicySeverity) -> Self {
        Self { severity, total_count: 0, projects: BTreeMap::new() }
    }

    /// Sum of `violation_count` over every listed version.
    pub fn violation_sum(&self) -> u64 {
        self.projects
            .values()
            .flat_map(|p| p.versions.iter())
            .map(|v| v.violation_count)
            .sum()
    }
}

/// Policy detail tree: category -> policy name -> node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDetails {
    pub categories: BTreeMap<PolicyCategory, BTreeMap<String, PolicyNode>>,
}

/// Compact category -> policy name -> total count view for display.
pub type PolicyBreakdown = BTreeMap<PolicyCategory, BTreeMap<String, u64>>;

impl PolicyDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn node(&self, category: PolicyCategory, policy_name: &str) -> Option<&PolicyNode> {
        self.categories.get(&category)?.get(policy_name)
    }

    /// Records one violation of `policy_name` by a version of the given
    /// project. The node severity is fixed by the first sighting.
    pub fn record(
        &mut self,
        category: PolicyCategory,
        policy_name: &str,
        project_id: &str,
        project_name: &str,
        violation: VersionViolation,
    ) {
        let node = self
            .categories
            .entry(category)
            .or_default()
            .entry(policy_name.to_string())
            .or_insert_with(|| PolicyNode::new(violation.severity));
        node.total_count += violation.violation_count;
        node.projects
            .entry(project_id.to_string())
            .or_insert_with(|| PolicyProjectEntry {
                project_id: project_id.to_string(),
                project_name: project_name.to_string(),
                versions: Vec::new(),
            })
            .versions
            .push(violation);
    }

    /// Folds another tree into this one. Version entries of a project already
    /// present are appended.
    pub fn merge(&mut self, other: &PolicyDetails) {
        for (category, policies) in &other.categories {
            let target = self.categories.entry(*category).or_default();
            for (name, node) in policies {
                let merged = target
                    .entry(name.clone())
                    .or_insert_with(|| PolicyNode::new(node.severity));
                merged.total_count += node.total_count;
                for (project_id, entry) in &node.projects {
                    match merged.projects.get_mut(project_id) {
                        Some(existing) => existing.versions.extend(entry.versions.iter().cloned()),
                        None => {
                            merged.projects.insert(project_id.clone(), entry.clone());
                        }
                    }
                }
            }
        }
    }

    /// Copy of the tree keeping only the version entries accepted by `keep`.
    /// Projects and policies left without versions are dropped and every
    /// `total_count` is recomputed from the kept entries.
    pub fn filtered<F>(&self, keep: F) -> PolicyDetails
    where
        F: Fn(&VersionViolation) -> bool,
    {
        let mut result = PolicyDetails::new();
        for (category, policies) in &self.categories {
            for (name, node) in policies {
                let mut kept = PolicyNode::new(node.severity);
                for (project_id, entry) in &node.projects {
                    let versions: Vec<VersionViolation> =
                        entry.versions.iter().filter(|v| keep(v)).cloned().collect();
                    if versions.is_empty() {
                        continue;
                    }
                    kept.total_count += versions.iter().map(|v| v.violation_count).sum::<u64>();
                    kept.projects.insert(project_id.clone(), PolicyProjectEntry {
                        project_id: entry.project_id.clone(),
                        project_name: entry.project_name.clone(),
                        versions,
                    });
                }
                if !kept.projects.is_empty() {
                    result.categories.entry(*category).or_default().insert(name.clone(), kept);
                }
            }
        }
        result
    }

    /// Projects the tree onto policy totals. Every category is present, even
    /// when it has no policies.
    pub fn breakdown(&self) -> PolicyBreakdown {
        let mut breakdown: PolicyBreakdown = PolicyCategory::ALL
            .into_iter()
            .map(|category| (category, BTreeMap::new()))
            .collect();
        for (category, policies) in &self.categories {
            let entry = breakdown.entry(*category).or_default();
            for (name, node) in policies {
                entry.insert(name.clone(), node.total_count);
            }
        }
        breakdown
    }
}
