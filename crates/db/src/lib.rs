pub mod jira;

use std::str::FromStr;

use bugmirror_common::error::{MirrorError, MirrorResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open (creating if absent) the SQLite store at `db_path` and ensure the
/// `jira_issues` table exists.
///
/// The pool holds a single connection: the run owns the store exclusively.
pub async fn create_pool(db_path: &str) -> MirrorResult<SqlitePool> {
    tracing::info!(db_path, "opening issue store");
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    connect_with(options).await
}

/// In-memory store, used by tests.
pub async fn create_memory_pool() -> MirrorResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| MirrorError::Database(e.to_string()))?;
    connect_with(options).await
}

async fn connect_with(options: SqliteConnectOptions) -> MirrorResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| MirrorError::Database(e.to_string()))?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Create the `jira_issues` table if it does not exist. The layout matches
/// stores written by earlier versions of the sync script.
pub async fn ensure_schema(pool: &SqlitePool) -> MirrorResult<()> {
    sqlx::query(
        "create table if not exists jira_issues (
           id integer primary key autoincrement,
           issue_key text unique not null,
           summary text not null,
           description text,
           priority text,
           status text,
           assignee text,
           security_level text,
           created_date text,
           updated_date text,
           component text,
           issue_type text,
           project text,
           fetched_at timestamp default current_timestamp
         )",
    )
    .execute(pool)
    .await
    .map_err(|e| MirrorError::Database(e.to_string()))?;
    Ok(())
}
