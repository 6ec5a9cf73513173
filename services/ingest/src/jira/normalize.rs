use bugmirror_db::jira::models::IssueRecord;

use super::models::{JiraIssue, JiraNamed};

pub const NO_DESCRIPTION: &str = "No description available";
pub const UNDEFINED_PRIORITY: &str = "Undefined";
pub const UNKNOWN: &str = "Unknown";
pub const UNASSIGNED: &str = "Unassigned";
pub const NO_COMPONENT: &str = "No component";

/// Convert an API issue into the canonical stored record, substituting
/// placeholders for missing fields. Never fails.
pub fn normalize(issue: &JiraIssue) -> IssueRecord {
    let f = &issue.fields;

    IssueRecord {
        issue_key: issue.key.clone(),
        summary: f.summary.clone(),
        description: f
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        priority: named_or(f.priority.as_ref(), UNDEFINED_PRIORITY),
        status: named_or(f.status.as_ref(), UNKNOWN),
        assignee: f
            .assignee
            .as_ref()
            .and_then(|a| a.display_name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string()),
        // Blank security names count as unset.
        security_level: f
            .security
            .as_ref()
            .and_then(JiraNamed::name)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        created_date: f.created.clone(),
        updated_date: f.updated.clone(),
        component: flatten_components(f.components.as_deref().unwrap_or_default()),
        issue_type: named_or(f.issuetype.as_ref(), UNKNOWN),
        project: f
            .project
            .as_ref()
            .and_then(|p| p.key.clone())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

fn named_or(field: Option<&JiraNamed>, default: &str) -> String {
    field
        .and_then(JiraNamed::name)
        .unwrap_or(default)
        .to_string()
}

/// Join distinct component names in source order with `", "`.
fn flatten_components(components: &[JiraNamed]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in components.iter().filter_map(JiraNamed::name) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        NO_COMPONENT.to_string()
    } else {
        names.join(", ")
    }
}
