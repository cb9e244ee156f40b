//! Database connection and backend selection.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use r2agi_core::store::memory::InMemoryStore;
use r2agi_core::store::KvStore;

use crate::config::{Backend, Config};
use crate::migrate;
use crate::sqlite_store::SqliteStore;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.store.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Builds the key-value backend named by `store.backend`.
///
/// The SQLite schema is created on open, so a fresh path works without a
/// prior `init`. Returns `None` for the `none` backend.
pub async fn open_backend(config: &Config) -> Result<Option<Arc<dyn KvStore>>> {
    let store: Arc<dyn KvStore> = match config.store.backend {
        Backend::Sqlite => {
            let pool = connect(config).await?;
            migrate::create_schema(&pool).await?;
            Arc::new(SqliteStore::new(pool))
        }
        Backend::Memory => Arc::new(InMemoryStore::new()),
        Backend::Disabled => return Ok(None),
    };
    Ok(Some(store))
}
