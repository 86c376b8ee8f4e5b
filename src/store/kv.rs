//! SQLite-backed key-value store
//!
//! Wraps the on-device persistent map: string keys, JSON document values,
//! one row per key. Uses SQLite with WAL mode for crash safety. Atomicity
//! is single-key; there is no cross-key transaction.
//!
//! Read failures are caught, logged, and downgraded to `None`. Callers
//! treat a missing key as an empty collection, never as an error. Write
//! failures are logged and re-thrown.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Persistent string-keyed map plus the per-key write locks that serialize
/// read-modify-write cycles on a collection.
#[derive(Clone)]
pub struct KvStore {
    pool: SqlitePool,
    write_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Build connection options for the on-disk database.
fn connect_options(db_path: &Path) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display())).map(
        |opts| {
            opts.create_if_missing(true)
                .busy_timeout(Duration::from_secs(5))
                .journal_mode(SqliteJournalMode::Wal)
        },
    )
}

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
        .execute(pool)
        .await?;
    Ok(())
}

impl KvStore {
    /// Open (creating if missing) the store at the given database path.
    pub async fn open(db_path: &Path) -> Result<Self> {
        tracing::info!("Opening key-value store at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options(db_path)?)
            .await?;

        init_schema(&pool).await?;

        Ok(Self {
            pool,
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Open an in-memory store (used by tests).
    ///
    /// A single connection keeps every operation on the same in-memory
    /// database; separate connections would each see their own.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        init_schema(&pool).await?;

        Ok(Self {
            pool,
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Read the value stored under a key.
    ///
    /// Backend failures are logged and reported as `None`, the same as a
    /// missing key.
    pub async fn get(&self, key: &str) -> Option<String> {
        let result = sqlx::query_scalar::<_, String>("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to read key {}: {}", key, e);
                None
            }
        }
    }

    /// Write (upsert) the value stored under a key.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write key {}: {}", key, e);
            e
        })?;

        tracing::debug!("Wrote key: {} ({} bytes)", key, value.len());
        Ok(())
    }

    /// Delete one key. Deleting a missing key is a no-op.
    pub async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to remove key {}: {}", key, e);
                e
            })?;

        tracing::debug!("Removed key: {}", key);
        Ok(())
    }

    /// Delete a batch of keys in one transaction.
    pub async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for key in keys {
            sqlx::query("DELETE FROM kv WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to remove key {}: {}", key, e);
                    e
                })?;
        }

        tx.commit().await?;

        tracing::debug!("Removed {} keys", keys.len());
        Ok(())
    }

    /// Delete every key in the store.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM kv")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear store: {}", e);
                e
            })?;

        tracing::info!("Key-value store cleared");
        Ok(())
    }

    /// Acquire the write lock for a key. The guard must be held across the
    /// whole read-modify-write cycle so concurrent writers to the same
    /// collection cannot lose updates.
    pub async fn write_lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.write_locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}
