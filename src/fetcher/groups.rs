use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use crate::errors::MetricsError;
use crate::models::upstream::{ProjectGroupChild, ProjectItem};
use tracing::{debug, info, warn};

/// Project group lookups needed to resolve a group scope.
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Groups matching an upstream `name:` query.
    async fn find_groups(&self, name: &str) -> Result<Vec<ProjectGroupChild>, MetricsError>;

    /// Direct children of a group: nested groups and project links.
    async fn children(&self, group_href: &str) -> Result<Vec<ProjectGroupChild>, MetricsError>;

    async fn project(&self, href: &str) -> Result<ProjectItem, MetricsError>;
}

/// Collects every project reachable from the group named `group_name`.
///
/// Groups are visited breadth-first from an explicit queue. A group href is
/// expanded at most once, so cyclic or shared subgroups terminate. Projects
/// reachable through several groups are emitted once.
pub async fn walk_project_groups<A: GroupApi + ?Sized>(
    api: &A,
    group_name: &str,
) -> Result<Vec<ProjectItem>, MetricsError> {
    let roots: Vec<ProjectGroupChild> = api
        .find_groups(group_name)
        .await?
        .into_iter()
        .filter(|g| g.name == group_name)
        .collect();

    if roots.is_empty() {
        warn!(group = group_name, "Project group not found");
        return Ok(Vec::new());
    }

    let mut queue: VecDeque<String> = roots.into_iter().map(|g| g.meta.href).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_projects: HashSet<String> = HashSet::new();
    let mut projects = Vec::new();

    while let Some(group_href) = queue.pop_front() {
        if !visited.insert(group_href.clone()) {
            continue;
        }
        debug!(group = %group_href, "Expanding project group");

        for child in api.children(&group_href).await? {
            if child.is_group() {
                if !visited.contains(&child.meta.href) {
                    queue.push_back(child.meta.href);
                }
            } else if seen_projects.insert(child.meta.href.clone()) {
                projects.push(api.project(&child.meta.href).await?);
            }
        }
    }

    info!(group = group_name, groups = visited.len(), projects = projects.len(), "Resolved project group");
    Ok(projects)
}
