use chrono::Utc;

use bugmirror_db::jira::repositories::{IssueStore, IssueStoreTx};

use super::models::JiraIssue;
use super::normalize::normalize;
use crate::connector::{IssueSource, RunStats};
use crate::error::RunError;

/// Mirrors one JQL search into the issue store.
///
/// A run is `fetching → upserting → committed`, or `failed` with the
/// run's transaction rolled back. Rows committed by earlier runs are never
/// touched by a failed run.
pub struct JiraIssueSyncer<C, S> {
    source: C,
    store: S,
}

impl<C, S> JiraIssueSyncer<C, S>
where
    C: IssueSource,
    S: IssueStore,
{
    pub fn new(source: C, store: S) -> Self {
        Self { source, store }
    }

    pub async fn reconcile(&self, jql: &str, limit: u32) -> Result<RunStats, RunError> {
        tracing::info!(phase = "fetching", jql = %jql, limit, "searching jira issues");

        let issues = match self.source.search(jql, limit).await {
            Ok(issues) => issues,
            Err(e) => {
                tracing::error!(phase = "failed", error = %e, "jira issue search failed");
                return Err(RunError::Fetch(e));
            }
        };

        tracing::info!(count = issues.len(), "found jira issues");

        let mut tx = self.store.begin().await.map_err(RunError::StoreWrite)?;
        tracing::info!(phase = "upserting", "writing issues to store");

        if let Err(e) = upsert_all(&mut tx, &issues).await {
            tracing::error!(phase = "failed", error = %e, "issue sync aborted, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "explicit rollback failed");
            }
            return Err(e);
        }

        tx.commit().await.map_err(RunError::StoreWrite)?;
        tracing::info!(phase = "committed", stored = issues.len(), "issue sync committed");

        let total_count = self.store.count_all().await.map_err(RunError::StoreWrite)?;
        let per_priority_counts = self
            .store
            .count_by_priority()
            .await
            .map_err(RunError::StoreWrite)?
            .into_iter()
            .map(|pc| (pc.priority, pc.count))
            .collect();

        Ok(RunStats {
            fetched_count: issues.len(),
            total_count,
            per_priority_counts,
        })
    }
}

/// Normalize and upsert each issue in order, stopping at the first failure.
async fn upsert_all<T: IssueStoreTx>(tx: &mut T, issues: &[JiraIssue]) -> Result<(), RunError> {
    for issue in issues {
        let record = normalize(issue);
        if record.issue_key.trim().is_empty() {
            return Err(RunError::MalformedRecord(format!(
                "issue {:?} has an empty key",
                record.summary
            )));
        }

        tracing::info!(
            key = %record.issue_key,
            summary = %record.summary,
            priority = %record.priority,
            status = %record.status,
            assignee = %record.assignee,
            components = %record.component,
            security = ?record.security_level,
            "upserting issue"
        );

        tx.upsert_issue(&record, Utc::now())
            .await
            .map_err(RunError::StoreWrite)?;
    }
    Ok(())
}
