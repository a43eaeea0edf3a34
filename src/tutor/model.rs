//! Local model lifecycle
//!
//! The manager moves through `unloaded -> loading -> loaded`, reverting to
//! `unloaded` when an attempt fails. Loads are single-flight: callers that
//! arrive while an attempt is running wait for it and share its outcome
//! instead of starting their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::storage::{self, DurableStore, Namespace, StorageError};

/// Key of the cached descriptor in the `models` namespace
pub const CACHED_MODEL_KEY: &str = "local-model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Unloaded,
    Loading,
    Loaded,
}

impl ModelStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ModelStatus::Loading,
            2 => ModelStatus::Loaded,
            _ => ModelStatus::Unloaded,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ModelStatus::Unloaded => 0,
            ModelStatus::Loading => 1,
            ModelStatus::Loaded => 2,
        }
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelStatus::Unloaded => write!(f, "not loaded"),
            ModelStatus::Loading => write!(f, "loading"),
            ModelStatus::Loaded => write!(f, "loaded"),
        }
    }
}

/// Point-in-time view of the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelHandle {
    pub status: ModelStatus,
    pub name: String,
    pub size: String,
}

impl ModelHandle {
    pub fn is_loading(&self) -> bool {
        self.status == ModelStatus::Loading
    }
}

/// Persisted description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    pub size: String,
    /// Layer widths, input to output
    pub layers: Vec<usize>,
    pub input_shape: Vec<usize>,
    pub created_at: DateTime<Utc>,
}

impl ModelDescriptor {
    /// Minimal single-unit dense model used until real weights ship
    pub fn placeholder(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            layers: vec![1],
            input_shape: vec![1],
            created_at: Utc::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model cache unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("model manager has been disposed")]
    Disposed,
}

pub struct ModelLifecycleManager {
    store: Arc<dyn DurableStore>,
    name: String,
    size: String,
    status: AtomicU8,
    descriptor: StdMutex<Option<ModelDescriptor>>,
    /// Held for the duration of a load attempt
    in_flight: Mutex<()>,
    started_attempts: AtomicU64,
    finished_attempts: AtomicU64,
    disposed: AtomicBool,
}

impl ModelLifecycleManager {
    pub fn new(store: Arc<dyn DurableStore>, name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            size: size.into(),
            status: AtomicU8::new(ModelStatus::Unloaded.as_u8()),
            descriptor: StdMutex::new(None),
            in_flight: Mutex::new(()),
            started_attempts: AtomicU64::new(0),
            finished_attempts: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Current state. Never waits on an in-flight load.
    pub fn info(&self) -> ModelHandle {
        ModelHandle {
            status: self.status(),
            name: self.name.clone(),
            size: self.size.clone(),
        }
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Descriptor of the loaded model, if any
    pub fn descriptor(&self) -> Option<ModelDescriptor> {
        self.descriptor.lock().ok().and_then(|d| d.clone())
    }

    /// Number of load attempts started so far
    pub fn load_attempts(&self) -> u64 {
        self.started_attempts.load(Ordering::SeqCst)
    }

    /// Load the model unless it is already loaded or being loaded.
    ///
    /// Failures are logged and absorbed; the returned status tells the caller
    /// whether a model is available.
    pub async fn ensure_loaded(&self) -> ModelStatus {
        if self.status() == ModelStatus::Loaded {
            return ModelStatus::Loaded;
        }

        let finished_before = self.finished_attempts.load(Ordering::SeqCst);
        let _attempt = self.in_flight.lock().await;

        if self.status() == ModelStatus::Loaded {
            return ModelStatus::Loaded;
        }
        if self.finished_attempts.load(Ordering::SeqCst) != finished_before {
            // An attempt ran while we waited; its outcome is ours
            return self.status();
        }
        if self.disposed.load(Ordering::SeqCst) {
            debug!("Skipping model load: manager disposed");
            return ModelStatus::Unloaded;
        }

        self.started_attempts.fetch_add(1, Ordering::SeqCst);
        self.set_status(ModelStatus::Loading);

        let outcome = self.load().await;
        let status = match outcome {
            Ok(descriptor) => {
                if let Ok(mut slot) = self.descriptor.lock() {
                    *slot = Some(descriptor);
                }
                ModelStatus::Loaded
            }
            Err(ModelLoadError::Disposed) => {
                debug!("Skipping model load: manager disposed");
                ModelStatus::Unloaded
            }
            Err(e) => {
                warn!("Error loading model '{}': {}", self.name, e);
                ModelStatus::Unloaded
            }
        };

        self.set_status(status);
        self.finished_attempts.fetch_add(1, Ordering::SeqCst);
        status
    }

    /// Release the model. Waits for an in-flight attempt, and prevents further loads.
    ///
    /// The cached descriptor stays in the store for the next process.
    pub async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let _attempt = self.in_flight.lock().await;

        if let Ok(mut slot) = self.descriptor.lock() {
            *slot = None;
        }
        self.set_status(ModelStatus::Unloaded);
        debug!("Model manager disposed");
    }

    async fn load(&self) -> Result<ModelDescriptor, ModelLoadError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(ModelLoadError::Disposed);
        }

        let cached: Option<ModelDescriptor> =
            storage::get_record(self.store.as_ref(), Namespace::Models, CACHED_MODEL_KEY).await?;

        if let Some(descriptor) = cached {
            info!("Loaded model '{}' from local cache", descriptor.name);
            return Ok(descriptor);
        }

        let descriptor = ModelDescriptor::placeholder(&self.name, &self.size);
        storage::put_record(self.store.as_ref(), Namespace::Models, CACHED_MODEL_KEY, &descriptor).await?;
        info!("Created placeholder model '{}' ({})", descriptor.name, descriptor.size);

        Ok(descriptor)
    }

    fn set_status(&self, status: ModelStatus) {
        self.status.store(status.as_u8(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn manager(store: Arc<SqliteStore>) -> ModelLifecycleManager {
        ModelLifecycleManager::new(store, "DeepSeek-R1", "1.3B")
    }

    #[tokio::test]
    async fn test_initial_info() {
        let manager = manager(Arc::new(SqliteStore::in_memory().unwrap()));
        let info = manager.info();

        assert_eq!(info.status, ModelStatus::Unloaded);
        assert_eq!(info.name, "DeepSeek-R1");
        assert_eq!(info.size, "1.3B");
        assert!(!info.is_loading());
        assert!(manager.descriptor().is_none());
    }

    #[tokio::test]
    async fn test_first_load_persists_placeholder() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let manager = manager(store.clone());

        assert_eq!(manager.ensure_loaded().await, ModelStatus::Loaded);
        assert_eq!(manager.info().status, ModelStatus::Loaded);

        let cached: Option<ModelDescriptor> =
            storage::get_record(store.as_ref(), Namespace::Models, CACHED_MODEL_KEY).await.unwrap();
        assert_eq!(cached, manager.descriptor());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_noops() {
        let manager = manager(Arc::new(SqliteStore::in_memory().unwrap()));

        for _ in 0..3 {
            manager.ensure_loaded().await;
        }
        assert_eq!(manager.load_attempts(), 1);
    }

    #[tokio::test]
    async fn test_cached_descriptor_is_reused() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let cached = ModelDescriptor::placeholder("cached-model", "7B");
        storage::put_record(store.as_ref(), Namespace::Models, CACHED_MODEL_KEY, &cached)
            .await
            .unwrap();

        let manager = manager(store);
        assert_eq!(manager.ensure_loaded().await, ModelStatus::Loaded);
        assert_eq!(manager.descriptor(), Some(cached));
    }

    #[tokio::test]
    async fn test_corrupt_cache_reverts_to_unloaded() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .put(Namespace::Models, CACHED_MODEL_KEY, serde_json::json!({ "name": 3 }))
            .await
            .unwrap();

        let manager = manager(store);
        assert_eq!(manager.ensure_loaded().await, ModelStatus::Unloaded);
        assert_eq!(manager.info().status, ModelStatus::Unloaded);
        assert!(manager.descriptor().is_none());
    }

    #[tokio::test]
    async fn test_dispose_unloads_and_blocks_reload() {
        let manager = manager(Arc::new(SqliteStore::in_memory().unwrap()));
        manager.ensure_loaded().await;

        manager.dispose().await;
        assert_eq!(manager.info().status, ModelStatus::Unloaded);
        assert!(manager.descriptor().is_none());

        assert_eq!(manager.ensure_loaded().await, ModelStatus::Unloaded);
    }

    #[tokio::test]
    async fn test_disposed_manager_never_starts_an_attempt() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let manager = manager(store.clone());

        manager.dispose().await;
        assert_eq!(manager.ensure_loaded().await, ModelStatus::Unloaded);
        assert_eq!(manager.ensure_loaded().await, ModelStatus::Unloaded);

        assert_eq!(manager.load_attempts(), 0);
        assert!(!manager.info().is_loading());
        assert_eq!(store.count(Namespace::Models).await.unwrap(), 0);
    }
}
