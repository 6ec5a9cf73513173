use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let err = MirrorError::Database("disk I/O error".to_string());
        assert_eq!(err.to_string(), "database error: disk I/O error");

        let err = MirrorError::Config("JIRA_TOKEN is required but not set".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: JIRA_TOKEN is required but not set"
        );
    }
}
