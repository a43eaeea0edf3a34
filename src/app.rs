//! Service wiring
//!
//! [`App`] builds the repositories and tutor over one shared store and hands
//! them out by `Arc`. Presentation code receives an `App` (or the individual
//! handles) instead of reaching for globals.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::content::ContentRepository;
use crate::progress::{ProgressRepository, ProgressTracker};
use crate::storage::{DurableStore, Namespace, SqliteStore, StorageError};
use crate::tutor::{ModelLifecycleManager, ResponseEngine, TutorSession};
use crate::users::UserRepository;

/// Entry counts per user-data namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub users: usize,
    pub content: usize,
    pub progress: usize,
}

#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn DurableStore>,
    pub content: Arc<ContentRepository>,
    pub progress: Arc<ProgressRepository>,
    pub users: Arc<UserRepository>,
    pub model: Arc<ModelLifecycleManager>,
    pub engine: Arc<ResponseEngine>,
}

impl App {
    /// Open the configured database and wire every service over it
    pub async fn open(config: &Config) -> Result<Self, StorageError> {
        let store = SqliteStore::open(&config.storage.database_path).await?;
        info!("Using store at {}", config.storage.database_path.display());
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Wire every service over an existing store
    pub fn with_store(store: Arc<dyn DurableStore>, config: &Config) -> Self {
        let model = Arc::new(ModelLifecycleManager::new(
            store.clone(),
            config.model.name.clone(),
            config.model.size.clone(),
        ));

        Self {
            content: Arc::new(ContentRepository::new(store.clone())),
            progress: Arc::new(ProgressRepository::new(store.clone())),
            users: Arc::new(UserRepository::new(store.clone())),
            engine: Arc::new(ResponseEngine::new(model.clone(), config.tutor.delay())),
            model,
            store,
        }
    }

    /// Progress cache for one user, filled from the store
    pub async fn tracker(&self, user_id: &str) -> Result<ProgressTracker, StorageError> {
        let tracker = ProgressTracker::new(self.progress.clone(), user_id);
        tracker.load().await?;
        Ok(tracker)
    }

    /// Fresh chat transcript backed by the shared engine
    pub fn session(&self) -> TutorSession {
        TutorSession::new(self.engine.clone())
    }

    pub async fn storage_info(&self) -> Result<StorageInfo, StorageError> {
        Ok(StorageInfo {
            users: self.store.count(Namespace::Users).await?,
            content: self.store.count(Namespace::Content).await?,
            progress: self.store.count(Namespace::Progress).await?,
        })
    }

    /// Remove all user data. The cached model descriptor is kept.
    ///
    /// Namespaces are cleared one by one; a failure leaves earlier ones cleared.
    pub async fn clear_all_data(&self) -> Result<(), StorageError> {
        for namespace in [Namespace::Users, Namespace::Content, Namespace::Progress] {
            self.store.clear(namespace).await?;
        }
        info!("Cleared all user data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressRecord;
    use crate::users::UserProfile;

    fn app() -> App {
        App::with_store(Arc::new(SqliteStore::in_memory().unwrap()), &Config::default())
    }

    #[tokio::test]
    async fn test_storage_info_and_clear() {
        let app = app();

        app.content.ensure_seeded().await.unwrap();
        app.users.save_user(&UserProfile::new("demo-user", "Learner")).await.unwrap();
        app.progress.save(&ProgressRecord::new("demo-user", "intro")).await.unwrap();
        app.model.ensure_loaded().await;

        let info = app.storage_info().await.unwrap();
        assert_eq!(info, StorageInfo { users: 1, content: 2, progress: 1 });

        app.clear_all_data().await.unwrap();
        assert_eq!(app.storage_info().await.unwrap(), StorageInfo::default());
        assert_eq!(app.store.count(Namespace::Models).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let app = app();
        let tracker = app.tracker("demo-user").await.unwrap();

        tracker.complete_lesson("intro", "lesson-1").await.unwrap();
        assert!(app.progress.get("demo-user", "intro").await.unwrap().is_some());
    }
}
