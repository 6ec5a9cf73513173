use serde::{Deserialize, Serialize};

/// The authenticated account (`/rest/api/2/myself`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

/// Paged search response from `/rest/api/2/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

/// The subset of issue fields mirrored locally. Everything but `summary` may
/// be missing or null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueFields {
    pub summary: String,
    pub description: Option<String>,
    pub priority: Option<JiraNamed>,
    pub status: Option<JiraNamed>,
    pub assignee: Option<JiraAssignee>,
    pub security: Option<JiraNamed>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub issuetype: Option<JiraNamed>,
    pub project: Option<JiraProject>,
    pub components: Option<Vec<JiraNamed>>,
}

/// Any `{ "name": ... }` shaped field (priority, status, security level, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraAssignee {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    pub key: Option<String>,
}

impl JiraNamed {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Field list requested from the search endpoint.
pub const SEARCH_FIELDS: &[&str] = &[
    "summary",
    "description",
    "priority",
    "status",
    "assignee",
    "security",
    "created",
    "updated",
    "issuetype",
    "project",
    "components",
];
