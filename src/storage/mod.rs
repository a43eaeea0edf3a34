//! Durable key-value storage
//!
//! Every entity kind lives in its own [`Namespace`] and is addressed by a key
//! derived from its identity. Values are JSON documents; the typed helpers at
//! the bottom of this module handle (de)serialization for the repositories.

pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Logical partition of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Users,
    Content,
    Progress,
    Models,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Users => "users",
            Namespace::Content => "content",
            Namespace::Progress => "progress",
            Namespace::Models => "models",
        }
    }

    /// All namespaces, in declaration order
    pub fn all() -> &'static [Namespace] {
        &[Namespace::Users, Namespace::Content, Namespace::Progress, Namespace::Models]
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure of the persistent medium
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("corrupt entry in '{namespace}': {reason}")]
    Corrupt { namespace: Namespace, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::DiskFull) | Some(ErrorCode::TooBig) => {
                StorageError::QuotaExceeded(err.to_string())
            }
            Some(ErrorCode::DatabaseCorrupt) | Some(ErrorCode::NotADatabase) => {
                // The medium itself is damaged, not a single entry
                StorageError::Unavailable(format!("database corrupt: {}", err))
            }
            Some(ErrorCode::CannotOpen)
            | Some(ErrorCode::DatabaseBusy)
            | Some(ErrorCode::DatabaseLocked)
            | Some(ErrorCode::ReadOnly) => StorageError::Unavailable(err.to_string()),
            _ => StorageError::Database(err),
        }
    }
}

/// Predicate evaluated against each stored value during [`DurableStore::iterate`]
pub type ValueFilter<'a> = &'a (dyn Fn(&Value) -> bool + Send + Sync);

/// Asynchronous, namespaced persistent key-value medium
///
/// Writes to the same `(namespace, key)` are last-write-wins. There are no
/// transactions spanning namespaces.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Insert or replace the value stored under `key`
    async fn put(&self, namespace: Namespace, key: &str, value: Value) -> Result<(), StorageError>;

    /// Fetch the value stored under `key`, if any
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Value>, StorageError>;

    /// Visit every entry of the namespace, keeping those the predicate accepts.
    /// No ordering is guaranteed.
    async fn iterate(&self, namespace: Namespace, predicate: ValueFilter<'_>) -> Result<Vec<Value>, StorageError>;

    /// Number of entries in the namespace
    async fn count(&self, namespace: Namespace) -> Result<usize, StorageError>;

    /// Remove every entry of the namespace
    async fn clear(&self, namespace: Namespace) -> Result<(), StorageError>;
}

/// Serialize `record` and store it under `key`
pub async fn put_record<T>(
    store: &dyn DurableStore,
    namespace: Namespace,
    key: &str,
    record: &T,
) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(record)?;
    store.put(namespace, key, value).await
}

/// Load and deserialize the record stored under `key`
pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DurableStore,
    namespace: Namespace,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(namespace, key).await? {
        Some(value) => decode(namespace, Some(key), value).map(Some),
        None => Ok(None),
    }
}

/// Deserialize every value of the namespace accepted by `predicate`
pub async fn collect_records<T: DeserializeOwned>(
    store: &dyn DurableStore,
    namespace: Namespace,
    predicate: ValueFilter<'_>,
) -> Result<Vec<T>, StorageError> {
    store
        .iterate(namespace, predicate)
        .await?
        .into_iter()
        .map(|value| decode(namespace, None, value))
        .collect()
}

fn decode<T: DeserializeOwned>(namespace: Namespace, key: Option<&str>, value: Value) -> Result<T, StorageError> {
    serde_json::from_value(value).map_err(|e| StorageError::Corrupt {
        namespace,
        reason: match key {
            Some(key) => format!("key '{}': {}", key, e),
            None => e.to_string(),
        },
    })
}
