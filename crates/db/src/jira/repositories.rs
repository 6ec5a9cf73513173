use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::jira::models::{IssueRecord, PriorityCount};
use bugmirror_common::error::MirrorResult;

#[async_trait]
pub trait IssueStore: Send + Sync {
    type Tx: IssueStoreTx;

    /// Start the transaction that scopes all upserts of one run.
    async fn begin(&self) -> MirrorResult<Self::Tx>;

    async fn count_all(&self) -> MirrorResult<i64>;

    /// Row counts grouped by priority, ordered by priority name. Rows with a
    /// NULL priority are counted under `Undefined`, merged with any rows
    /// already stored as `Undefined`.
    async fn count_by_priority(&self) -> MirrorResult<Vec<PriorityCount>>;
}

/// An open write transaction. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait IssueStoreTx: Send + Sized {
    /// Insert the record, or replace every column of the row with the same
    /// `issue_key`.
    async fn upsert_issue(
        &mut self,
        issue: &IssueRecord,
        fetched_at: DateTime<Utc>,
    ) -> MirrorResult<()>;

    async fn commit(self) -> MirrorResult<()>;

    async fn rollback(self) -> MirrorResult<()>;
}
