use bugmirror_config::IssueQuerySettings;

/// Resolve the JQL for a run: the explicit override if configured, otherwise
/// the bug search built from the query settings.
pub fn resolve_jql(settings: &IssueQuerySettings) -> String {
    match &settings.jql_override {
        Some(jql) => jql.clone(),
        None => build_bug_search_jql(settings),
    }
}

/// Build a JQL query for recently created bugs in one project.
///
/// Generates: `project = RHEL AND issuetype = bug AND created > -30d AND
/// Priority in (Undefined, Major) AND component in componentMatch("^glibc$")`.
/// Priority and component clauses are omitted when unset.
pub fn build_bug_search_jql(settings: &IssueQuerySettings) -> String {
    let mut clauses = vec![
        format!("project = {}", escape_jql_value(&settings.project)),
        "issuetype = bug".to_string(),
        format!("created > -{}d", settings.created_within_days),
    ];

    if !settings.priorities.is_empty() {
        clauses.push(priority_in_clause(&settings.priorities));
    }

    if !settings.component_pattern.is_empty() {
        clauses.push(format!(
            "component in componentMatch(\"{}\")",
            settings.component_pattern.replace('\\', "\\\\").replace('"', "\\\"")
        ));
    }

    clauses.join(" AND ")
}

fn priority_in_clause(priorities: &[String]) -> String {
    let escaped: Vec<String> = priorities.iter().map(|p| escape_jql_value(p)).collect();
    format!("Priority in ({})", escaped.join(", "))
}

/// Escape a JQL value — wrap in quotes if it contains special characters.
fn escape_jql_value(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_build_the_rhel_bug_query() {
        let jql = build_bug_search_jql(&IssueQuerySettings::default());
        assert_eq!(
            jql,
            "project = RHEL AND issuetype = bug AND created > -30d AND \
             Priority in (Undefined, Major, Critical, Blocker) AND \
             component in componentMatch(\"^(glibc|kernel|kernel-rt|kernel-automotive)($|/ .*$)\")"
        );
    }

    #[test]
    fn empty_priorities_and_pattern_are_omitted() {
        let settings = IssueQuerySettings {
            project: "DEV".to_string(),
            priorities: vec![],
            component_pattern: String::new(),
            created_within_days: 7,
            jql_override: None,
        };
        assert_eq!(
            build_bug_search_jql(&settings),
            "project = DEV AND issuetype = bug AND created > -7d"
        );
    }

    #[test]
    fn multi_word_priority_is_quoted() {
        let clause = priority_in_clause(&["Major".to_string(), "Very High".to_string()]);
        assert_eq!(clause, "Priority in (Major, \"Very High\")");
    }

    #[test]
    fn component_pattern_escapes_backslashes_and_quotes() {
        let settings = IssueQuerySettings {
            priorities: vec![],
            component_pattern: r#"^kernel\d+"x"$"#.to_string(),
            ..IssueQuerySettings::default()
        };
        let jql = build_bug_search_jql(&settings);
        assert!(
            jql.ends_with(r#"component in componentMatch("^kernel\\d+\"x\"$")"#),
            "got: {jql}"
        );
    }

    #[test]
    fn override_wins_over_parts() {
        let settings = IssueQuerySettings {
            jql_override: Some("key = RHEL-1".to_string()),
            ..IssueQuerySettings::default()
        };
        assert_eq!(resolve_jql(&settings), "key = RHEL-1");
    }

    #[test]
    fn no_override_builds_query() {
        let settings = IssueQuerySettings::default();
        assert_eq!(resolve_jql(&settings), build_bug_search_jql(&settings));
    }

    #[test]
    fn key_with_hyphen_is_quoted() {
        assert_eq!(escape_jql_value("MY-PROJ"), "\"MY-PROJ\"");
        assert_eq!(escape_jql_value("RHEL"), "RHEL");
    }
}
