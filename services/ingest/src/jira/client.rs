use std::time::Duration;

use async_trait::async_trait;
use bugmirror_config::AppConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{JiraIssue, JiraSearchResponse, JiraUser, SEARCH_FIELDS};
use crate::connector::IssueSource;

/// Issues requested per search page.
const SEARCH_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl JiraClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.jira_base_url.clone(),
            api_token: config.jira_token.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraClientConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum JiraClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    DecodeError(#[from] serde_json::Error),
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// The account the token authenticates as. Fails on a rejected token.
    pub async fn myself(&self) -> Result<JiraUser, JiraClientError> {
        let url = format!("{}/rest/api/2/myself", self.config.base_url);
        self.get_json(&url, &[]).await
    }

    /// Run a JQL search, following pages until `max_results` issues have been
    /// collected or the result set is exhausted. Single attempt per page: any
    /// failure aborts the whole search.
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
    ) -> Result<Vec<JiraIssue>, JiraClientError> {
        let url = format!("{}/rest/api/2/search", self.config.base_url);
        let fields = SEARCH_FIELDS.join(",");
        let limit = max_results as usize;
        let mut start_at: u32 = 0;
        let mut all_issues = Vec::new();

        while all_issues.len() < limit {
            let page_size = std::cmp::min(SEARCH_PAGE_SIZE, (limit - all_issues.len()) as u32);
            let query = [
                ("jql", jql.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", page_size.to_string()),
                ("fields", fields.clone()),
            ];

            let page: JiraSearchResponse = self.get_json(&url, &query).await?;
            let page_len = page.issues.len() as u32;
            tracing::debug!(start_at, page_len, total = page.total, "fetched search page");
            all_issues.extend(page.issues);

            start_at += page_len;
            if page_len == 0 || start_at >= page.total {
                break;
            }
        }

        all_issues.truncate(limit);
        Ok(all_issues)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, JiraClientError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.config.api_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(JiraClientError::HttpError { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn search(&self, jql: &str, limit: u32) -> Result<Vec<JiraIssue>, JiraClientError> {
        self.search_issues(jql, limit).await
    }
}
