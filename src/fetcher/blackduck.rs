use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use crate::errors::MetricsError;
use crate::metrics::filter::VersionFilter;
use crate::models::upstream::{
    BearerToken, Page, PolicyRuleItem, ProjectGroupChild, ProjectItem, SnippetCountsPayload,
    VersionItem, VulnerableComponentItem,
};
use super::groups::{walk_project_groups, GroupApi};
use super::source::{MetricsSource, ProjectScope};
use tracing::{debug, info};

/// Largest page size the API accepts.
pub const MAX_LIMIT: u64 = 1000;

const USER_4: &str = "application/vnd.blackducksoftware.user-4+json";
const PROJECT_DETAIL_4: &str = "application/vnd.blackducksoftware.project-detail-4+json";
const PROJECT_DETAIL_5: &str = "application/vnd.blackducksoftware.project-detail-5+json";
const INTERNAL_1: &str = "application/vnd.blackducksoftware.internal-1+json";
const BOM_6: &str = "application/vnd.blackducksoftware.bill-of-materials-6+json";
const BOM_7: &str = "application/vnd.blackducksoftware.bill-of-materials-7+json";

type Query = Vec<(String, String)>;

/// Connection settings for a Black Duck server.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Base URL without trailing slash
    pub url: String,
    pub token: String,
    pub insecure: bool,
    pub timeout_secs: u64,
}

pub struct BlackDuckClient {
    client: Client,
    settings: ServerSettings,
    bearer: String,
}

impl BlackDuckClient {
    /// Builds the HTTP client and exchanges the API token for a bearer token.
    pub async fn connect(settings: ServerSettings) -> Result<Self, MetricsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(|e| MetricsError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let mut this = Self { client, settings, bearer: String::new() };
        this.authenticate().await?;
        Ok(this)
    }

    async fn authenticate(&mut self) -> Result<(), MetricsError> {
        let url = format!("{}/api/tokens/authenticate", self.settings.url);
        let resp = self.client
            .post(&url)
            .header(AUTHORIZATION, format!("token {}", self.settings.token))
            .header(ACCEPT, USER_4)
            .send()
            .await
            .map_err(|e| MetricsError::Network(format!("Authentication request failed: {}", e)))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MetricsError::Authentication("Black Duck rejected the access token".into()));
        }
        if !status.is_success() {
            return Err(MetricsError::Upstream { status: status.as_u16(), url });
        }

        let token: BearerToken = resp.json().await
            .map_err(|e| MetricsError::Authentication(format!("Invalid authentication response: {}", e)))?;
        self.bearer = token.bearer_token;
        info!(url = %self.settings.url, expires_in_ms = ?token.expires_in_milliseconds, "Authenticated to Black Duck");
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, accept: &str, query: &Query) -> Result<T, MetricsError> {
        debug!(url, "GET");
        let resp = self.client
            .get(url)
            .bearer_auth(&self.bearer)
            .header(ACCEPT, accept)
            .query(query)
            .send()
            .await
            .map_err(|e| MetricsError::Network(format!("GET {} failed: {}", url, e)))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MetricsError::Authentication(format!("Bearer token rejected for {}", url)));
        }
        if !status.is_success() {
            return Err(MetricsError::Upstream { status: status.as_u16(), url: url.to_string() });
        }

        resp.json().await
            .map_err(|e| MetricsError::Network(format!("Invalid response from {}: {}", url, e)))
    }

    /// Fetches every page of a collection and returns them as one page.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: &str,
        query: &Query,
    ) -> Result<Page<T>, MetricsError> {
        let mut first = query.clone();
        first.push(("limit".into(), MAX_LIMIT.to_string()));
        let mut page: Page<T> = self.get(url, accept, &first).await?;

        let total = page.total_count.unwrap_or(0);
        let mut downloaded = MAX_LIMIT;
        while total > downloaded {
            let mut next = query.clone();
            next.push(("offset".into(), downloaded.to_string()));
            next.push(("limit".into(), MAX_LIMIT.to_string()));
            let more: Page<T> = self.get(url, accept, &next).await?;
            if let Some(items) = more.items {
                page.items.get_or_insert_with(Vec::new).extend(items);
            }
            downloaded += MAX_LIMIT;
        }
        Ok(page)
    }
}

/// Upstream query parameters equivalent to a version filter.
pub fn version_query(filter: &VersionFilter) -> Query {
    let mut query = Query::new();
    for phase in filter.phases.iter().flatten() {
        query.push(("filter".into(), format!("phase:{}", phase)));
    }
    for distribution in filter.distributions.iter().flatten() {
        query.push(("filter".into(), format!("distribution:{}", distribution)));
    }
    if let Some(name) = &filter.version_name {
        query.push(("q".into(), format!("versionName:{}", name)));
    }
    query
}

#[async_trait]
impl GroupApi for BlackDuckClient {
    async fn find_groups(&self, name: &str) -> Result<Vec<ProjectGroupChild>, MetricsError> {
        let url = format!("{}/api/project-groups", self.settings.url);
        let query = vec![("q".to_string(), format!("name:{}", name))];
        let page: Page<ProjectGroupChild> = self.get(&url, PROJECT_DETAIL_5, &query).await?;
        Ok(page.into_records())
    }

    async fn children(&self, group_href: &str) -> Result<Vec<ProjectGroupChild>, MetricsError> {
        let url = format!("{}/children", group_href);
        let page: Page<ProjectGroupChild> = self.get_all(&url, PROJECT_DETAIL_5, &Query::new()).await?;
        Ok(page.into_records())
    }

    async fn project(&self, href: &str) -> Result<ProjectItem, MetricsError> {
        self.get(href, PROJECT_DETAIL_5, &Query::new()).await
    }
}

#[async_trait]
impl MetricsSource for BlackDuckClient {
    async fn projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectItem>, MetricsError> {
        let url = format!("{}/api/projects", self.settings.url);
        match scope {
            ProjectScope::All => {
                let page: Page<ProjectItem> = self.get_all(&url, PROJECT_DETAIL_4, &Query::new()).await?;
                Ok(page.into_records())
            }
            ProjectScope::Named(name) => {
                let query = vec![("q".to_string(), format!("name:{}", name))];
                let page: Page<ProjectItem> = self.get_all(&url, PROJECT_DETAIL_4, &query).await?;
                Ok(page.into_records())
            }
            ProjectScope::Group(name) => walk_project_groups(self, name).await,
        }
    }

    async fn versions(
        &self,
        project: &ProjectItem,
        filter: &VersionFilter,
    ) -> Result<Page<VersionItem>, MetricsError> {
        let url = format!("{}/versions", project.meta.href);
        self.get_all(&url, INTERNAL_1, &version_query(filter)).await
    }

    async fn snippet_counts(&self, version: &VersionItem) -> Result<SnippetCountsPayload, MetricsError> {
        let url = format!("{}/snippet-counts", version.meta.href);
        self.get(&url, INTERNAL_1, &Query::new()).await
    }

    async fn vulnerable_components(
        &self,
        version: &VersionItem,
    ) -> Result<Page<VulnerableComponentItem>, MetricsError> {
        let url = format!("{}/vulnerable-bom-components", version.meta.href);
        self.get_all(&url, BOM_6, &Query::new()).await
    }

    async fn policy_violations(&self, version: &VersionItem) -> Result<Page<PolicyRuleItem>, MetricsError> {
        let url = format!("{}/policy-rules", version.meta.href);
        self.get_all(&url, BOM_7, &Query::new()).await
    }

    async fn reconnect(&mut self) -> Result<(), MetricsError> {
        info!("Renewing Black Duck session");
        self.authenticate().await
    }

    fn source_name(&self) -> &str {
        "blackduck"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_query_empty_filter() {
        assert!(version_query(&VersionFilter::default()).is_empty());
    }

    #[test]
    fn test_version_query_repeats_filter_params() {
        let filter = VersionFilter::new(
            Some("1.0".into()),
            Some(vec!["RELEASED".into(), "DEVELOPMENT".into()]),
            Some(vec!["EXTERNAL".into()]),
        );
        let query = version_query(&filter);
        assert_eq!(query, vec![
            ("filter".to_string(), "phase:RELEASED".to_string()),
            ("filter".to_string(), "phase:DEVELOPMENT".to_string()),
            ("filter".to_string(), "distribution:EXTERNAL".to_string()),
            ("q".to_string(), "versionName:1.0".to_string()),
        ]);
    }
}
