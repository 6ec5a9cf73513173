use bugmirror_common::error::MirrorError;

use crate::jira::client::JiraClientError;

/// Run-level failure. Every variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to fetch issues: {0}")]
    Fetch(#[from] JiraClientError),

    #[error("failed to write issue store: {0}")]
    StoreWrite(#[source] MirrorError),

    #[error("malformed issue record: {0}")]
    MalformedRecord(String),
}

impl From<MirrorError> for RunError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::Config(msg) => RunError::Configuration(msg),
            other => RunError::StoreWrite(other),
        }
    }
}
