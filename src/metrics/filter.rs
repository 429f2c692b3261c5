//! Version filtering and re-aggregation of cached project records.

use serde::{Deserialize, Serialize};
use crate::models::{ProjectRecord, VersionRecord};

/// Version selection of a run. An absent dimension matches every version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFilter {
    /// Exact, case-sensitive version name.
    pub version_name: Option<String>,
    /// Upper-cased phase names.
    pub phases: Option<Vec<String>>,
    /// Upper-cased distribution names.
    pub distributions: Option<Vec<String>>,
}

fn normalize(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.map(|list| {
        list.into_iter()
            .map(|v| v.trim().to_uppercase())
            .filter(|v| !v.is_empty())
            .collect()
    })
}

impl VersionFilter {
    /// Builds a filter, trimming and upper-casing the category lists.
    pub fn new(
        version_name: Option<String>,
        phases: Option<Vec<String>>,
        distributions: Option<Vec<String>>,
    ) -> Self {
        Self {
            version_name,
            phases: normalize(phases),
            distributions: normalize(distributions),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.version_name.is_none() && self.phases.is_none() && self.distributions.is_none()
    }

    /// All three dimensions must match.
    pub fn matches(&self, version_name: &str, phase: &str, distribution: &str) -> bool {
        let name_ok = self.version_name.as_deref().map_or(true, |wanted| wanted == version_name);
        let phase_ok = self
            .phases
            .as_ref()
            .map_or(true, |phases| phases.contains(&phase.to_uppercase()));
        let distribution_ok = self
            .distributions
            .as_ref()
            .map_or(true, |dists| dists.contains(&distribution.to_uppercase()));
        name_ok && phase_ok && distribution_ok
    }

    pub fn matches_version(&self, version: &VersionRecord) -> bool {
        self.matches(&version.version_name, &version.phase, &version.distribution)
    }
}

/// Rebuilds a project record from the versions accepted by `filter`.
///
/// Every bundle is re-summed from the kept versions; nothing is subtracted
/// from the cached totals. The policy detail subtree is filtered with the
/// same predicate and its totals recomputed.
pub fn filter_project(project: &ProjectRecord, filter: &VersionFilter) -> ProjectRecord {
    let mut rebuilt = ProjectRecord::new(&project.project_id, &project.project_name, &project.updated_at);

    for version in project.versions.iter().filter(|v| filter.matches_version(v)) {
        rebuilt.vulnerabilities.merge(&version.vulnerabilities);
        rebuilt.policy_violations.merge(&version.policy_violations);
        rebuilt.snippets.merge(&version.snippets);
        rebuilt.mark_dormant(version.is_dormant);
        rebuilt.versions.push(version.clone());
    }
    rebuilt.project_version_count = rebuilt.versions.len() as u64;
    rebuilt.policy_details = project
        .policy_details
        .filtered(|v| filter.matches(&v.version_name, &v.phase, &v.distribution));
    rebuilt
}
