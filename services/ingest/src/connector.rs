use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::jira::client::JiraClientError;
use crate::jira::models::JiraIssue;

/// Outcome of a committed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Issues fetched and upserted by this run.
    pub fetched_count: usize,
    /// Rows in the whole store after commit.
    pub total_count: i64,
    /// Whole-store row counts per priority.
    pub per_priority_counts: BTreeMap<String, i64>,
}

/// Black-box issue search: at most `limit` issues matching `jql`.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn search(&self, jql: &str, limit: u32) -> Result<Vec<JiraIssue>, JiraClientError>;
}
