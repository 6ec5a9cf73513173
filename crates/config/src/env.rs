use bugmirror_common::error::{MirrorError, MirrorResult};
use std::env;

pub const DEFAULT_JIRA_URL: &str = "https://issues.redhat.com/";
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

/// File in the user's home directory holding `JIRA_TOKEN` / `JIRA_DB_PATH`.
const HOME_ENV_FILE: &str = ".jira_env";

/// Parts of the default bug search query. Ignored when `jql_override` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuerySettings {
    pub project: String,
    pub priorities: Vec<String>,
    pub component_pattern: String,
    pub created_within_days: u32,
    pub jql_override: Option<String>,
}

impl Default for IssueQuerySettings {
    fn default() -> Self {
        Self {
            project: "RHEL".to_owned(),
            priorities: ["Undefined", "Major", "Critical", "Blocker"]
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            component_pattern: "^(glibc|kernel|kernel-rt|kernel-automotive)($|/ .*$)".to_owned(),
            created_within_days: 30,
            jql_override: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: String,
    pub jira_token: String,
    pub db_path: String,
    pub query: IssueQuerySettings,
    pub max_results: u32,
    pub timeout_secs: u64,
    pub log_level: String,
}

/// Per-invocation values that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub jql: Option<String>,
    pub max_results: Option<u32>,
    pub db_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from `~/.jira_env`, then `./.env`, then the process
    /// environment. Variables already set in the environment win.
    pub fn from_env() -> MirrorResult<Self> {
        Self::from_env_with(&ConfigOverrides::default())
    }

    /// Like [`AppConfig::from_env`], with `overrides` applied before
    /// validation, so an override can stand in for a required variable.
    pub fn from_env_with(overrides: &ConfigOverrides) -> MirrorResult<Self> {
        // Best-effort dotenv loads; ignore if missing
        if let Some(home) = dirs::home_dir() {
            let _ = dotenvy::from_path(home.join(HOME_ENV_FILE));
        }
        let _ = dotenvy::dotenv();

        Self::from_process_env_with(overrides)
    }

    /// Read configuration from the process environment only.
    pub fn from_process_env() -> MirrorResult<Self> {
        Self::from_process_env_with(&ConfigOverrides::default())
    }

    pub fn from_process_env_with(overrides: &ConfigOverrides) -> MirrorResult<Self> {
        let defaults = IssueQuerySettings::default();

        let jira_base_url = normalize_base_url(&get_var_or("JIRA_URL", DEFAULT_JIRA_URL))?;
        let jira_token = get_non_empty_var("JIRA_TOKEN")?;
        let db_path = match overrides.db_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_owned(),
            Some(_) => return Err(MirrorError::Config("--db-path is set but empty".to_owned())),
            None => get_non_empty_var("JIRA_DB_PATH")?,
        };

        let priorities = match env::var("JIRA_PRIORITIES") {
            Ok(raw) => parse_csv(&raw),
            Err(_) => defaults.priorities,
        };

        let query = IssueQuerySettings {
            project: get_var_or("JIRA_PROJECT", &defaults.project),
            priorities,
            component_pattern: get_var_or("JIRA_COMPONENT_PATTERN", &defaults.component_pattern),
            created_within_days: parse_var("JIRA_CREATED_WITHIN_DAYS", defaults.created_within_days)?,
            jql_override: overrides
                .jql
                .clone()
                .or_else(|| env::var("JIRA_JQL").ok())
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty()),
        };

        Ok(Self {
            jira_base_url,
            jira_token,
            db_path,
            query,
            max_results: match overrides.max_results {
                Some(max_results) => max_results,
                None => parse_var("JIRA_MAX_RESULTS", DEFAULT_MAX_RESULTS)?,
            },
            timeout_secs: parse_var("JIRA_TIMEOUT_SECS", 30)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }
}

fn get_var(key: &str) -> MirrorResult<String> {
    env::var(key).map_err(|_| MirrorError::Config(format!("{key} is required but not set")))
}

fn get_non_empty_var(key: &str) -> MirrorResult<String> {
    let value = get_var(key)?;
    if value.trim().is_empty() {
        return Err(MirrorError::Config(format!("{key} is set but empty")));
    }
    Ok(value)
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &str, default: T) -> MirrorResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MirrorError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Require an http(s) scheme and strip trailing slashes so paths can be appended.
fn normalize_base_url(raw: &str) -> MirrorResult<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(MirrorError::Config(format!(
            "JIRA_URL must start with http:// or https://, got {trimmed:?}"
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}
