//! SQLite-backed durable store

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{DurableStore, Namespace, StorageError, ValueFilter};

/// Single-file SQLite store holding every namespace in one table
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::init_schema(&conn)?;

        debug!("Opened durable store at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS entries (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );
        "#)?;

        Ok(())
    }

    fn parse_value(namespace: Namespace, key: &str, raw: &str) -> Result<Value, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Corrupt {
            namespace,
            reason: format!("key '{}': {}", key, e),
        })
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn put(&self, namespace: Namespace, key: &str, value: Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        let conn = self.conn.lock().await;

        conn.execute(
            r#"INSERT OR REPLACE INTO entries (namespace, key, value, updated_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![namespace.as_str(), key, raw, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Value>, StorageError> {
        let conn = self.conn.lock().await;

        let raw: Option<String> = conn
            .prepare_cached("SELECT value FROM entries WHERE namespace = ?1 AND key = ?2")?
            .query_row(params![namespace.as_str(), key], |row| row.get(0))
            .optional()?;

        raw.map(|raw| Self::parse_value(namespace, key, &raw)).transpose()
    }

    async fn iterate(&self, namespace: Namespace, predicate: ValueFilter<'_>) -> Result<Vec<Value>, StorageError> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare_cached("SELECT key, value FROM entries WHERE namespace = ?1")?;
        let rows = stmt
            .query_map(params![namespace.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut matched = Vec::new();
        for (key, raw) in rows {
            let value = Self::parse_value(namespace, &key, &raw)?;
            if predicate(&value) {
                matched.push(value);
            }
        }

        Ok(matched)
    }

    async fn count(&self, namespace: Namespace) -> Result<usize, StorageError> {
        let conn = self.conn.lock().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
            params![namespace.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    async fn clear(&self, namespace: Namespace) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;

        let removed = conn.execute("DELETE FROM entries WHERE namespace = ?1", params![namespace.as_str()])?;
        debug!("Cleared {} entries from '{}'", removed, namespace);

        Ok(())
    }
}
