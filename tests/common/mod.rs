#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bdmetrics::errors::MetricsError;
use bdmetrics::fetcher::{MetricsSource, ProjectScope, ServerSettings};
use bdmetrics::metrics::VersionFilter;
use bdmetrics::models::upstream::{
    Meta, Page, PolicyRuleItem, ProjectItem, SnippetCountsPayload, VersionItem,
    VulnerabilityWithRemediation, VulnerableComponentItem,
};
use bdmetrics::pipeline::RunConfig;
use chrono::{Duration, Utc};

pub const BASE: &str = "https://bd.example.com/api";

/// In-memory Black Duck instance.
#[derive(Default)]
pub struct FakeSource {
    pub projects: Vec<ProjectItem>,
    versions: HashMap<String, Vec<VersionItem>>,
    components: HashMap<String, Vec<VulnerableComponentItem>>,
    policies: HashMap<String, Vec<PolicyRuleItem>>,
    snippets: HashMap<String, SnippetCountsPayload>,
    failing_project: Option<String>,
    pub reconnects: Arc<AtomicUsize>,
    /// Project IDs whose versions were fetched, in call order.
    pub fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, id: &str, name: &str, updated_at: &str) -> Self {
        self.projects.push(ProjectItem {
            name: name.to_string(),
            updated_at: updated_at.to_string(),
            meta: Meta { href: format!("{}/projects/{}", BASE, id) },
        });
        self
    }

    pub fn version(
        mut self,
        project_id: &str,
        version_id: &str,
        name: &str,
        phase: &str,
        last_scan_date: Option<String>,
    ) -> Self {
        self.versions.entry(project_id.to_string()).or_default().push(VersionItem {
            version_name: Some(name.to_string()),
            phase: Some(phase.to_string()),
            distribution: Some("EXTERNAL".to_string()),
            last_scan_date,
            meta: Meta { href: format!("{}/projects/{}/versions/{}", BASE, project_id, version_id) },
        });
        self
    }

    pub fn component(mut self, version_id: &str, status: Option<&str>, severity: Option<&str>) -> Self {
        self.components.entry(version_id.to_string()).or_default().push(VulnerableComponentItem {
            vulnerability_with_remediation: Some(VulnerabilityWithRemediation {
                remediation_status: status.map(str::to_string),
                severity: severity.map(str::to_string),
            }),
        });
        self
    }

    pub fn policy(mut self, version_id: &str, name: &str, category: &str, severity: &str, count: u64) -> Self {
        self.policies.entry(version_id.to_string()).or_default().push(PolicyRuleItem {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            severity: Some(severity.to_string()),
            bom_violation_count: count,
        });
        self
    }

    pub fn snippets(mut self, version_id: &str, unreviewed: u64, reviewed: u64, ignored: u64) -> Self {
        self.snippets.insert(
            version_id.to_string(),
            SnippetCountsPayload {
                snippet_scan_present: Some(true),
                unreviewed_count: unreviewed,
                reviewed_count: reviewed,
                ignored_count: ignored,
                total_count: Some(unreviewed + reviewed + ignored),
            },
        );
        self
    }

    /// Every version request for this project fails with an upstream error.
    pub fn failing(mut self, project_id: &str) -> Self {
        self.failing_project = Some(project_id.to_string());
        self
    }

    pub fn fetched_projects(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSource for FakeSource {
    async fn projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectItem>, MetricsError> {
        Ok(match scope {
            ProjectScope::All => self.projects.clone(),
            ProjectScope::Named(name) => self.projects.iter().filter(|p| &p.name == name).cloned().collect(),
            ProjectScope::Group(_) => Vec::new(),
        })
    }

    async fn versions(&self, project: &ProjectItem, _filter: &VersionFilter) -> Result<Page<VersionItem>, MetricsError> {
        let id = project.id().to_string();
        self.fetched.lock().unwrap().push(id.clone());
        if self.failing_project.as_deref() == Some(id.as_str()) {
            return Err(MetricsError::Upstream { status: 500, url: project.meta.href.clone() });
        }
        Ok(Page::of(self.versions.get(&id).cloned().unwrap_or_default()))
    }

    async fn snippet_counts(&self, version: &VersionItem) -> Result<SnippetCountsPayload, MetricsError> {
        Ok(self.snippets.get(version.id()).cloned().unwrap_or_default())
    }

    async fn vulnerable_components(&self, version: &VersionItem) -> Result<Page<VulnerableComponentItem>, MetricsError> {
        Ok(Page::of(self.components.get(version.id()).cloned().unwrap_or_default()))
    }

    async fn policy_violations(&self, version: &VersionItem) -> Result<Page<PolicyRuleItem>, MetricsError> {
        Ok(Page::of(self.policies.get(version.id()).cloned().unwrap_or_default()))
    }

    async fn reconnect(&mut self) -> Result<(), MetricsError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn source_name(&self) -> &str {
        "fake"
    }
}

pub fn run_config() -> RunConfig {
    RunConfig::new(ServerSettings {
        url: "https://bd.example.com".to_string(),
        token: "test-token".to_string(),
        insecure: false,
        timeout_secs: 5,
    })
}

pub fn days_ago(days: i64) -> Option<String> {
    Some((Utc::now() - Duration::days(days)).to_rfc3339())
}
