use async_trait::async_trait;
use crate::errors::MetricsError;
use crate::metrics::filter::VersionFilter;
use crate::models::upstream::{
    Page, PolicyRuleItem, ProjectItem, SnippetCountsPayload, VersionItem, VulnerableComponentItem,
};

/// Which projects a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    All,
    /// Projects matching an upstream `name:` query.
    Named(String),
    /// Every project reachable from the named project group.
    Group(String),
}

impl std::fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all projects"),
            Self::Named(name) => write!(f, "project '{}'", name),
            Self::Group(name) => write!(f, "project group '{}'", name),
        }
    }
}

#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Every project in scope, pagination already resolved
    async fn projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectItem>, MetricsError>;

    /// Versions of a project, narrowed upstream by the filter
    async fn versions(
        &self,
        project: &ProjectItem,
        filter: &VersionFilter,
    ) -> Result<Page<VersionItem>, MetricsError>;

    async fn snippet_counts(&self, version: &VersionItem) -> Result<SnippetCountsPayload, MetricsError>;

    async fn vulnerable_components(
        &self,
        version: &VersionItem,
    ) -> Result<Page<VulnerableComponentItem>, MetricsError>;

    async fn policy_violations(&self, version: &VersionItem) -> Result<Page<PolicyRuleItem>, MetricsError>;

    /// Renews the upstream session. Called periodically on long runs.
    async fn reconnect(&mut self) -> Result<(), MetricsError> {
        Ok(())
    }

    /// Source name for logging
    fn source_name(&self) -> &str;
}
