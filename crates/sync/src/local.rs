//! Durable local fallback.
//!
//! A single-table SQLite key-value store holding one JSON snapshot per
//! collection. It is written after every committed state change and read
//! once at startup; when empty, the caller falls back to the built-in seed
//! dataset.

use std::str::FromStr;

use anyhow::Context;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

/// Keys of the persisted snapshots.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    Products,
    Contacts,
    Invoices,
    Transactions,
    CompanyInfo,
    CurrentUser,
    Users,
}

impl SnapshotKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKey::Products => "products",
            SnapshotKey::Contacts => "contacts",
            SnapshotKey::Invoices => "invoices",
            SnapshotKey::Transactions => "transactions",
            SnapshotKey::CompanyInfo => "companyInfo",
            SnapshotKey::CurrentUser => "currentUser",
            SnapshotKey::Users => "users",
        }
    }
}

/// SQLite-backed snapshot store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (and create if missing) the snapshot database.
    ///
    /// `url` is an sqlx SQLite URL, e.g. `sqlite:///path/to/mizan.db` or
    /// `sqlite::memory:` for tests. A single connection keeps the in-memory
    /// variant coherent.
    pub async fn open(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid SQLite URL {url}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open snapshot store at {url}"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key      TEXT PRIMARY KEY,
                data     TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create snapshots table")?;

        Ok(Self { pool })
    }

    /// Write one snapshot, replacing any previous value under the key.
    pub async fn put<T: Serialize>(&self, key: SnapshotKey, value: &T) -> anyhow::Result<()> {
        let payload = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize snapshot {}", key.as_str()))?;
        sqlx::query(
            r#"
            INSERT INTO snapshots (key, data, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                data = excluded.data,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(key.as_str())
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write snapshot {}", key.as_str()))?;
        Ok(())
    }

    /// Read one snapshot, `None` when it was never written.
    pub async fn get<T: DeserializeOwned>(&self, key: SnapshotKey) -> anyhow::Result<Option<T>> {
        let row = sqlx::query("SELECT data FROM snapshots WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read snapshot {}", key.as_str()))?;

        let Some(row) = row else { return Ok(None) };
        let data: String = row.try_get("data")?;
        let value = serde_json::from_str(&data)
            .with_context(|| format!("corrupt snapshot {}", key.as_str()))?;
        Ok(Some(value))
    }

    /// Drop one snapshot (e.g. `currentUser` on logout).
    pub async fn remove(&self, key: SnapshotKey) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM snapshots WHERE key = ?1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove snapshot {}", key.as_str()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mizan_core::ProductId;
    use mizan_inventory::Product;

    fn product(name: &str) -> Product {
        Product::new(
            ProductId::new(),
            "P001",
            "",
            name,
            "Electronics",
            "Main",
            450.0,
            550.0,
            10,
            2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn snapshots_round_trip_and_overwrite() {
        let store = LocalStore::open("sqlite::memory:").await.unwrap();

        assert_eq!(
            store
                .get::<Vec<Product>>(SnapshotKey::Products)
                .await
                .unwrap(),
            None
        );

        let first = vec![product("Laptop")];
        store.put(SnapshotKey::Products, &first).await.unwrap();
        let second = vec![product("Laptop"), product("Mouse")];
        store.put(SnapshotKey::Products, &second).await.unwrap();

        let loaded: Vec<Product> = store
            .get(SnapshotKey::Products)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn removed_key_reads_back_as_none() {
        let store = LocalStore::open("sqlite::memory:").await.unwrap();
        store
            .put(SnapshotKey::CurrentUser, &serde_json::json!({"id": "u1"}))
            .await
            .unwrap();
        store.remove(SnapshotKey::CurrentUser).await.unwrap();
        assert_eq!(
            store
                .get::<serde_json::Value>(SnapshotKey::CurrentUser)
                .await
                .unwrap(),
            None
        );
    }
}
