use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Durable named slots holding serialized snapshots.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSlot {
    pub name: String,
    pub payload: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub name: String,
    pub size_bytes: u64,
    pub stored_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            // A single connection keeps `sqlite::memory:` databases shared.
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open cache database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run cache migrations")?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn load_slot(&self, name: &str) -> Result<Option<StoredSlot>> {
        let row = sqlx::query("SELECT name, payload, stored_at FROM cache_slots WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read cache slot '{name}'"))?;

        row.map(|r| -> Result<StoredSlot> {
            Ok(StoredSlot {
                name: r.try_get("name")?,
                payload: r.try_get("payload")?,
                stored_at: r.try_get("stored_at")?,
            })
        })
        .transpose()
    }

    /// Writes `payload` into `name`, replacing whatever was there.
    pub async fn save_slot(&self, name: &str, payload: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO cache_slots (name, payload, stored_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, stored_at = excluded.stored_at",
        )
        .bind(name)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write cache slot '{name}'"))?;
        debug!(slot = name, bytes = payload.len(), "cache slot written");
        Ok(())
    }

    /// Returns whether a slot was actually removed.
    pub async fn clear_slot(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cache_slots WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to clear cache slot '{name}'"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_slots(&self) -> Result<Vec<SlotSummary>> {
        let rows = sqlx::query(
            "SELECT name, LENGTH(CAST(payload AS BLOB)) AS size_bytes, stored_at
             FROM cache_slots ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list cache slots")?;

        rows.into_iter()
            .map(|r| -> Result<SlotSummary> {
                Ok(SlotSummary {
                    name: r.try_get("name")?,
                    size_bytes: r.try_get::<i64, _>("size_bytes")? as u64,
                    stored_at: r.try_get("stored_at")?,
                })
            })
            .collect()
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
