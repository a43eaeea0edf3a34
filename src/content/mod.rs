//! Lesson content
//!
//! Content modules are stored in the `content` namespace keyed by module id.
//! On first run the repository seeds a default curriculum (see [`seed`]).

pub mod seed;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::storage::{self, DurableStore, Namespace, StorageError};

/// A single lesson inside a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Markdown body
    pub content: String,
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A titled, ordered sequence of lessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentModule {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Navigation order
    pub lessons: Vec<Lesson>,
}

impl ContentModule {
    /// Find a lesson by id
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Lesson at a navigation position
    pub fn lesson_at(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Index of the following lesson, clamped to the last one
    pub fn next_lesson_index(&self, index: usize) -> usize {
        let last = self.lessons.len().saturating_sub(1);
        (index + 1).min(last)
    }

    /// Index of the preceding lesson, clamped to the first one
    pub fn previous_lesson_index(&self, index: usize) -> usize {
        index.saturating_sub(1)
    }
}

/// Read/write access to content modules
pub struct ContentRepository {
    store: Arc<dyn DurableStore>,
    defaults: Vec<ContentModule>,
    /// Serializes seeding passes; set while a failed pass left defaults missing
    seed_interrupted: Mutex<bool>,
}

impl ContentRepository {
    /// Repository that seeds the built-in curriculum on first use
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_defaults(store, seed::default_modules())
    }

    /// Repository with a custom seed set. An empty set disables seeding.
    pub fn with_defaults(store: Arc<dyn DurableStore>, defaults: Vec<ContentModule>) -> Self {
        Self {
            store,
            defaults,
            seed_interrupted: Mutex::new(false),
        }
    }

    /// All modules, seeding the defaults if the store holds none.
    ///
    /// No ordering is guaranteed for stored modules.
    pub async fn get_all_modules(&self) -> Result<Vec<ContentModule>, StorageError> {
        self.ensure_seeded().await
    }

    /// Seed the default modules if the content namespace is empty.
    ///
    /// Effective once: when any module exists the stored set is returned as-is.
    /// A pass that fails part-way leaves the written modules in place; the next
    /// call on this repository writes only the defaults still missing. The
    /// interruption is not remembered across processes.
    pub async fn ensure_seeded(&self) -> Result<Vec<ContentModule>, StorageError> {
        let mut interrupted = self.seed_interrupted.lock().await;

        let stored = self.stored_modules().await?;
        if self.defaults.is_empty() || (!stored.is_empty() && !*interrupted) {
            return Ok(stored);
        }

        let missing: Vec<&ContentModule> = self
            .defaults
            .iter()
            .filter(|module| !stored.iter().any(|m| m.id == module.id))
            .collect();

        if !missing.is_empty() {
            info!("Seeding {} default modules", missing.len());
            if let Err(e) = try_join_all(missing.iter().map(|module| self.save_module(module))).await {
                warn!("Seeding content failed: {}", e);
                *interrupted = true;
                return Err(e);
            }
        }
        *interrupted = false;

        if stored.is_empty() {
            Ok(self.defaults.clone())
        } else {
            self.stored_modules().await
        }
    }

    /// Look up a module by id
    pub async fn get_module(&self, id: &str) -> Result<Option<ContentModule>, StorageError> {
        storage::get_record(self.store.as_ref(), Namespace::Content, id).await
    }

    /// Insert or replace a module
    pub async fn save_module(&self, module: &ContentModule) -> Result<(), StorageError> {
        storage::put_record(self.store.as_ref(), Namespace::Content, &module.id, module).await
    }

    async fn stored_modules(&self) -> Result<Vec<ContentModule>, StorageError> {
        storage::collect_records(self.store.as_ref(), Namespace::Content, &|_| true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn module(id: &str, lessons: usize) -> ContentModule {
        ContentModule {
            id: id.to_string(),
            title: format!("Module {}", id),
            description: "test module".to_string(),
            lessons: (1..=lessons)
                .map(|n| Lesson::new(format!("lesson-{}", n), format!("Lesson {}", n), "# body"))
                .collect(),
        }
    }

    fn repo() -> ContentRepository {
        ContentRepository::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_save_then_get_is_deep_equal() {
        let repo = repo();
        let saved = module("geometry", 3);

        repo.save_module(&saved).await.unwrap();

        assert_eq!(repo.get_module("geometry").await.unwrap(), Some(saved));
        assert_eq!(repo.get_module("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_seeds_once_when_empty() {
        let repo = repo();

        let first = repo.get_all_modules().await.unwrap();
        assert_eq!(first, seed::default_modules());

        // Alter a seeded module; a second pass must not reset it
        let mut intro = repo.get_module("intro").await.unwrap().unwrap();
        intro.title = "Renamed".to_string();
        repo.save_module(&intro).await.unwrap();

        let second = repo.get_all_modules().await.unwrap();
        assert_eq!(second.len(), first.len());
        assert!(second.iter().any(|m| m.title == "Renamed"));
    }

    #[tokio::test]
    async fn test_existing_content_is_not_seeded() {
        let repo = repo();
        repo.save_module(&module("custom", 1)).await.unwrap();

        let modules = repo.ensure_seeded().await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "custom");
    }

    /// Fails the first write of one key, then behaves normally
    struct FailOnceStore {
        inner: SqliteStore,
        fail_key: std::sync::Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl DurableStore for FailOnceStore {
        async fn put(&self, namespace: Namespace, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
            let fail = {
                let mut fail_key = self.fail_key.lock().unwrap();
                if fail_key.as_deref() == Some(key) {
                    fail_key.take();
                    true
                } else {
                    false
                }
            };
            if fail {
                return Err(StorageError::QuotaExceeded("no space left".to_string()));
            }
            self.inner.put(namespace, key, value).await
        }

        async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
            self.inner.get(namespace, key).await
        }

        async fn iterate(
            &self,
            namespace: Namespace,
            predicate: storage::ValueFilter<'_>,
        ) -> Result<Vec<serde_json::Value>, StorageError> {
            self.inner.iterate(namespace, predicate).await
        }

        async fn count(&self, namespace: Namespace) -> Result<usize, StorageError> {
            self.inner.count(namespace).await
        }

        async fn clear(&self, namespace: Namespace) -> Result<(), StorageError> {
            self.inner.clear(namespace).await
        }
    }

    #[tokio::test]
    async fn test_interrupted_seed_resumes_missing_modules() {
        let store = Arc::new(FailOnceStore {
            inner: SqliteStore::in_memory().unwrap(),
            fail_key: std::sync::Mutex::new(Some("algebra".to_string())),
        });
        let repo = ContentRepository::new(store.clone());

        assert!(matches!(repo.ensure_seeded().await, Err(StorageError::QuotaExceeded(_))));
        assert!(repo.get_module("algebra").await.unwrap().is_none());

        let modules = repo.get_all_modules().await.unwrap();
        assert_eq!(modules.len(), seed::default_modules().len());
        assert_eq!(store.count(Namespace::Content).await.unwrap(), seed::default_modules().len());
        assert!(repo.get_module("algebra").await.unwrap().is_some());

        // Resumed passes are still effective once
        let mut intro = repo.get_module("intro").await.unwrap().unwrap();
        intro.title = "Renamed".to_string();
        repo.save_module(&intro).await.unwrap();
        let again = repo.ensure_seeded().await.unwrap();
        assert!(again.iter().any(|m| m.title == "Renamed"));
    }

    #[tokio::test]
    async fn test_empty_defaults_disable_seeding() {
        let repo = ContentRepository::with_defaults(Arc::new(SqliteStore::in_memory().unwrap()), Vec::new());
        assert!(repo.get_all_modules().await.unwrap().is_empty());
    }

    #[test]
    fn test_lesson_navigation_is_clamped() {
        let m = module("nav", 3);
        assert_eq!(m.next_lesson_index(0), 1);
        assert_eq!(m.next_lesson_index(2), 2);
        assert_eq!(m.previous_lesson_index(0), 0);
        assert_eq!(m.previous_lesson_index(2), 1);
        assert_eq!(m.lesson_at(1).map(|l| l.id.as_str()), Some("lesson-2"));
        assert!(m.lesson("lesson-9").is_none());

        let empty = module("empty", 0);
        assert_eq!(empty.next_lesson_index(0), 0);
    }
}
