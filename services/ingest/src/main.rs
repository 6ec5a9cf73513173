mod connector;
mod error;
mod jira;
mod report;

use std::process::ExitCode;

use clap::Parser;

use bugmirror_config::{init_tracing, AppConfig, ConfigOverrides};
use bugmirror_db::jira::sqlite_repository::SqliteIssueRepository;

use crate::connector::RunStats;
use crate::error::RunError;
use crate::jira::client::{JiraClient, JiraClientConfig};
use crate::jira::issue_sync::JiraIssueSyncer;
use crate::jira::query::resolve_jql;

/// Mirror matching Jira bugs into a local SQLite store.
#[derive(Debug, Parser)]
#[command(name = "bugmirror-ingest", version)]
struct Cli {
    /// JQL to run instead of the configured query.
    #[arg(long)]
    jql: Option<String>,

    /// Maximum number of issues to fetch.
    #[arg(long)]
    max_results: Option<u32>,

    /// SQLite store path (overrides JIRA_DB_PATH).
    #[arg(long)]
    db_path: Option<String>,
}

impl Cli {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            jql: self.jql,
            max_results: self.max_results,
            db_path: self.db_path,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let overrides = Cli::parse().into_overrides();

    // Config errors are reported before logging is set up, so print them directly.
    let config = match AppConfig::from_env_with(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error occurred: {}", RunError::from(e));
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log_level);
    tracing::info!(service = "bugmirror-ingest", "starting");

    match run(&config).await {
        Ok(summary) => {
            print!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "issue sync failed");
            eprintln!("Error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one sync and render its summary. The summary is produced while the
/// store is still open; the pool is closed on every path.
async fn run(config: &AppConfig) -> Result<String, RunError> {
    let client = JiraClient::new(JiraClientConfig::from_app_config(config))
        .map_err(|e| RunError::Configuration(format!("failed to build http client: {e}")))?;

    let pool = bugmirror_db::create_pool(&config.db_path).await?;

    let result = sync_issues(config, client, SqliteIssueRepository::new(pool.clone()))
        .await
        .map(|stats| report::render_summary(&stats));

    pool.close().await;
    tracing::info!("database connection closed");
    result
}

async fn sync_issues(
    config: &AppConfig,
    client: JiraClient,
    repo: SqliteIssueRepository,
) -> Result<RunStats, RunError> {
    let me = client.myself().await?;
    tracing::info!(
        user = me.display_name.as_deref().or(me.name.as_deref()).unwrap_or("unknown"),
        "authenticated"
    );

    let jql = resolve_jql(&config.query);
    let syncer = JiraIssueSyncer::new(client, repo);
    syncer.reconcile(&jql, config.max_results).await
}
