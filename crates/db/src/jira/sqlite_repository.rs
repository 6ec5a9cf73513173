use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::jira::models::{IssueRecord, PriorityCount, StoredIssue};
use crate::jira::repositories::{IssueStore, IssueStoreTx};
use bugmirror_common::error::{MirrorError, MirrorResult};

/// Label used for rows whose priority column is null (rows written by other tools).
const NULL_PRIORITY_LABEL: &str = "Undefined";

#[derive(Clone)]
pub struct SqliteIssueRepository {
    pool: SqlitePool,
}

impl SqliteIssueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_key(&self, issue_key: &str) -> MirrorResult<Option<StoredIssue>> {
        let row = sqlx::query(
            "select id, issue_key, summary, description, priority, status, assignee,
                    security_level, created_date, updated_date, component, issue_type,
                    project, fetched_at
             from jira_issues
             where issue_key = ?",
        )
        .bind(issue_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MirrorError::Database(e.to_string()))?;

        row.map(Self::map_row).transpose()
    }

    /// Number of rows stored under `issue_key` (at most one while the unique
    /// constraint holds).
    pub async fn count_by_key(&self, issue_key: &str) -> MirrorResult<i64> {
        let row = sqlx::query("select count(*) as cnt from jira_issues where issue_key = ?")
            .bind(issue_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MirrorError::Database(e.to_string()))?;
        row.try_get::<i64, _>("cnt")
            .map_err(|e| MirrorError::Database(e.to_string()))
    }

    fn map_row(row: SqliteRow) -> MirrorResult<StoredIssue> {
        let text = |col: &str| -> MirrorResult<Option<String>> {
            row.try_get::<Option<String>, _>(col)
                .map_err(|e| MirrorError::Database(e.to_string()))
        };
        let required = |col: &str| -> MirrorResult<String> {
            Ok(text(col)?.unwrap_or_default())
        };

        let record = IssueRecord {
            issue_key: required("issue_key")?,
            summary: required("summary")?,
            description: required("description")?,
            priority: required("priority")?,
            status: required("status")?,
            assignee: required("assignee")?,
            security_level: text("security_level")?,
            created_date: text("created_date")?,
            updated_date: text("updated_date")?,
            component: required("component")?,
            issue_type: required("issue_type")?,
            project: required("project")?,
        };

        Ok(StoredIssue {
            id: row
                .try_get("id")
                .map_err(|e| MirrorError::Database(e.to_string()))?,
            record,
            fetched_at: text("fetched_at")?.as_deref().and_then(parse_fetched_at),
        })
    }
}

/// Accepts RFC 3339 (written here) and naive ISO / SQLite `current_timestamp`
/// text (written by older tools, read as UTC).
fn parse_fetched_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl IssueStore for SqliteIssueRepository {
    type Tx = SqliteIssueTx;

    async fn begin(&self) -> MirrorResult<SqliteIssueTx> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MirrorError::Database(e.to_string()))?;
        Ok(SqliteIssueTx { tx })
    }

    async fn count_all(&self) -> MirrorResult<i64> {
        let row = sqlx::query("select count(*) as cnt from jira_issues")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MirrorError::Database(e.to_string()))?;
        row.try_get::<i64, _>("cnt")
            .map_err(|e| MirrorError::Database(e.to_string()))
    }

    async fn count_by_priority(&self) -> MirrorResult<Vec<PriorityCount>> {
        let rows = sqlx::query(
            "select coalesce(priority, ?) as priority, count(*) as cnt
             from jira_issues
             group by coalesce(priority, ?)
             order by 1",
        )
        .bind(NULL_PRIORITY_LABEL)
        .bind(NULL_PRIORITY_LABEL)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MirrorError::Database(e.to_string()))?;

        rows.iter()
            .map(|r| {
                Ok(PriorityCount {
                    priority: r
                        .try_get("priority")
                        .map_err(|e| MirrorError::Database(e.to_string()))?,
                    count: r
                        .try_get("cnt")
                        .map_err(|e| MirrorError::Database(e.to_string()))?,
                })
            })
            .collect()
    }
}

pub struct SqliteIssueTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl IssueStoreTx for SqliteIssueTx {
    async fn upsert_issue(
        &mut self,
        issue: &IssueRecord,
        fetched_at: DateTime<Utc>,
    ) -> MirrorResult<()> {
        sqlx::query(
            "insert into jira_issues
             (issue_key, summary, description, priority, status, assignee,
              security_level, created_date, updated_date, component, issue_type,
              project, fetched_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             on conflict (issue_key) do update set
               summary = excluded.summary,
               description = excluded.description,
               priority = excluded.priority,
               status = excluded.status,
               assignee = excluded.assignee,
               security_level = excluded.security_level,
               created_date = excluded.created_date,
               updated_date = excluded.updated_date,
               component = excluded.component,
               issue_type = excluded.issue_type,
               project = excluded.project,
               fetched_at = excluded.fetched_at",
        )
        .bind(&issue.issue_key)
        .bind(&issue.summary)
        .bind(&issue.description)
        .bind(&issue.priority)
        .bind(&issue.status)
        .bind(&issue.assignee)
        .bind(&issue.security_level)
        .bind(&issue.created_date)
        .bind(&issue.updated_date)
        .bind(&issue.component)
        .bind(&issue.issue_type)
        .bind(&issue.project)
        .bind(fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| MirrorError::Database(e.to_string()))?;
        Ok(())
    }

    async fn commit(self) -> MirrorResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| MirrorError::Database(e.to_string()))
    }

    async fn rollback(self) -> MirrorResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| MirrorError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_memory_pool;
    use chrono::Duration;

    async fn test_repo() -> SqliteIssueRepository {
        let pool = create_memory_pool().await.expect("memory pool");
        SqliteIssueRepository::new(pool)
    }

    fn record(key: &str, priority: &str) -> IssueRecord {
        IssueRecord {
            issue_key: key.to_string(),
            summary: format!("Summary of {key}"),
            description: "No description available".to_string(),
            priority: priority.to_string(),
            status: "New".to_string(),
            assignee: "Unassigned".to_string(),
            security_level: None,
            created_date: Some("2026-10-01T09:30:00.000+0000".to_string()),
            updated_date: Some("2026-10-02T11:00:00.000+0000".to_string()),
            component: "glibc".to_string(),
            issue_type: "Bug".to_string(),
            project: "RHEL".to_string(),
        }
    }

    async fn upsert_committed(repo: &SqliteIssueRepository, records: &[IssueRecord]) {
        let mut tx = repo.begin().await.expect("begin");
        for r in records {
            tx.upsert_issue(r, Utc::now()).await.expect("upsert");
        }
        tx.commit().await.expect("commit");
    }

    #[tokio::test]
    async fn upsert_inserts_new_row() {
        let repo = test_repo().await;
        let rec = record("RHEL-1", "Major");
        upsert_committed(&repo, &[rec.clone()]).await;

        let stored = repo.get_by_key("RHEL-1").await.expect("get").expect("row");
        assert_eq!(stored.record, rec);
        assert!(stored.fetched_at.is_some());
        assert_eq!(repo.count_all().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row_in_full() {
        let repo = test_repo().await;
        let mut first = record("RHEL-7", "Major");
        first.security_level = Some("Embargoed".to_string());
        let first_at = Utc::now() - Duration::minutes(5);
        let mut tx = repo.begin().await.expect("begin");
        tx.upsert_issue(&first, first_at).await.expect("upsert");
        tx.commit().await.expect("commit");

        let mut second = record("RHEL-7", "Critical");
        second.summary = "Updated summary".to_string();
        second.security_level = None;
        let second_at = Utc::now();
        let mut tx = repo.begin().await.expect("begin");
        tx.upsert_issue(&second, second_at).await.expect("upsert");
        tx.commit().await.expect("commit");

        assert_eq!(repo.count_by_key("RHEL-7").await.expect("count"), 1);
        let stored = repo.get_by_key("RHEL-7").await.expect("get").expect("row");
        assert_eq!(stored.record, second);
        assert!(stored.record.security_level.is_none());
        assert!(stored.fetched_at.expect("fetched_at") > first_at);
    }

    #[tokio::test]
    async fn aggregate_counts_cover_whole_store() {
        let repo = test_repo().await;
        upsert_committed(
            &repo,
            &[
                record("RHEL-1", "Critical"),
                record("RHEL-2", "Critical"),
                record("RHEL-3", "Major"),
            ],
        )
        .await;

        assert_eq!(repo.count_all().await.expect("count"), 3);
        let grouped = repo.count_by_priority().await.expect("grouped");
        assert_eq!(
            grouped,
            vec![
                PriorityCount {
                    priority: "Critical".to_string(),
                    count: 2
                },
                PriorityCount {
                    priority: "Major".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_has_no_groups() {
        let repo = test_repo().await;
        assert_eq!(repo.count_all().await.expect("count"), 0);
        assert!(repo.count_by_priority().await.expect("grouped").is_empty());
        assert!(repo.get_by_key("RHEL-404").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn rollback_discards_uncommitted_upserts() {
        let repo = test_repo().await;
        upsert_committed(&repo, &[record("RHEL-1", "Major")]).await;

        let mut tx = repo.begin().await.expect("begin");
        tx.upsert_issue(&record("RHEL-2", "Major"), Utc::now())
            .await
            .expect("upsert");
        tx.upsert_issue(&record("RHEL-1", "Blocker"), Utc::now())
            .await
            .expect("upsert");
        tx.rollback().await.expect("rollback");

        assert_eq!(repo.count_all().await.expect("count"), 1);
        let kept = repo.get_by_key("RHEL-1").await.expect("get").expect("row");
        assert_eq!(kept.record.priority, "Major");
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let repo = test_repo().await;
        {
            let mut tx = repo.begin().await.expect("begin");
            tx.upsert_issue(&record("RHEL-9", "Major"), Utc::now())
                .await
                .expect("upsert");
        }
        assert_eq!(repo.count_all().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn null_priority_rows_group_as_undefined() {
        let repo = test_repo().await;
        sqlx::query("insert into jira_issues (issue_key, summary) values ('OLD-1', 'legacy row')")
            .execute(&repo.pool)
            .await
            .expect("insert legacy");
        upsert_committed(&repo, &[record("RHEL-1", "Undefined")]).await;

        let grouped = repo.count_by_priority().await.expect("grouped");
        assert_eq!(
            grouped,
            vec![PriorityCount {
                priority: "Undefined".to_string(),
                count: 2
            }]
        );

        let legacy = repo.get_by_key("OLD-1").await.expect("get").expect("row");
        assert!(legacy.fetched_at.is_some(), "current_timestamp default parses");
    }

    #[test]
    fn parse_fetched_at_accepts_known_formats() {
        assert!(parse_fetched_at("2026-10-19T08:15:00.123456Z").is_some());
        assert!(parse_fetched_at("2026-10-19T08:15:00.123456").is_some());
        assert!(parse_fetched_at("2026-10-19 08:15:00").is_some());
        assert!(parse_fetched_at("yesterday").is_none());
    }
}
