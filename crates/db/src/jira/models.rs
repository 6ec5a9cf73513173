use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical, normalized issue row. Every field except `security_level` and
/// the source timestamps carries a placeholder rather than being empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub issue_key: String,
    pub summary: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub assignee: String,
    pub security_level: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub component: String,
    pub issue_type: String,
    pub project: String,
}

/// A row as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIssue {
    pub id: i64,
    pub record: IssueRecord,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}
