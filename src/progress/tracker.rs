//! In-memory mirror of a user's progress
//!
//! The tracker writes through to the [`ProgressRepository`] and only then
//! updates its cache, so a failed write never leaves the two out of step.
//! Saves are serialized by the cache lock, which keeps the cache in the same
//! order the store resolved the writes in.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{ProgressRecord, ProgressRepository};
use crate::storage::StorageError;

pub struct ProgressTracker {
    repo: Arc<ProgressRepository>,
    user_id: String,
    records: RwLock<Vec<ProgressRecord>>,
}

impl ProgressTracker {
    /// Empty tracker; call [`load`](Self::load) to fill it from the store
    pub fn new(repo: Arc<ProgressRepository>, user_id: impl Into<String>) -> Self {
        Self {
            repo,
            user_id: user_id.into(),
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the cache with the user's stored records
    pub async fn load(&self) -> Result<usize, StorageError> {
        let stored = self.repo.get_all(&self.user_id).await.map_err(|e| {
            warn!("Failed to load progress for '{}': {}", self.user_id, e);
            e
        })?;

        let count = stored.len();
        *self.records.write().await = stored;
        debug!("Loaded {} progress records for '{}'", count, self.user_id);

        Ok(count)
    }

    /// Persist a record, then merge it into the cache.
    ///
    /// An existing entry for the same `(user, module)` pair is replaced in
    /// place; otherwise the record is appended.
    pub async fn save(&self, record: ProgressRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;

        self.repo.save(&record).await.map_err(|e| {
            warn!("Failed to save progress {}: {}", record.key(), e);
            e
        })?;

        let existing = records
            .iter()
            .position(|r| r.user_id == record.user_id && r.module_id == record.module_id);
        match existing {
            Some(index) => records[index] = record,
            None => records.push(record),
        }

        Ok(())
    }

    /// Cached progress for one of this user's modules
    pub async fn module_progress(&self, module_id: &str) -> Option<ProgressRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.module_id == module_id && r.user_id == self.user_id)
            .cloned()
    }

    /// Snapshot of the cache, in insertion order
    pub async fn records(&self) -> Vec<ProgressRecord> {
        self.records.read().await.clone()
    }

    /// Mark a lesson completed, creating the module record on first use
    pub async fn complete_lesson(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord, StorageError> {
        let mut record = self.record_or_new(module_id).await;
        record.complete_lesson(lesson_id);
        self.save(record.clone()).await?;
        Ok(record)
    }

    /// Store a quiz score, creating the module record on first use
    pub async fn record_quiz_score(
        &self,
        module_id: &str,
        lesson_id: &str,
        score: f64,
    ) -> Result<ProgressRecord, StorageError> {
        let mut record = self.record_or_new(module_id).await;
        record.record_quiz_score(lesson_id, score);
        self.save(record.clone()).await?;
        Ok(record)
    }

    async fn record_or_new(&self, module_id: &str) -> ProgressRecord {
        self.module_progress(module_id)
            .await
            .unwrap_or_else(|| ProgressRecord::new(self.user_id.clone(), module_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn tracker(user: &str) -> (Arc<ProgressRepository>, ProgressTracker) {
        let repo = Arc::new(ProgressRepository::new(Arc::new(SqliteStore::in_memory().unwrap())));
        (repo.clone(), ProgressTracker::new(repo, user))
    }

    #[tokio::test]
    async fn test_save_replaces_in_place() {
        let (_, tracker) = tracker("alice");

        tracker.save(ProgressRecord::new("alice", "intro")).await.unwrap();
        tracker.save(ProgressRecord::new("alice", "algebra")).await.unwrap();

        let mut updated = ProgressRecord::new("alice", "intro");
        updated.complete_lesson("lesson-1");
        tracker.save(updated.clone()).await.unwrap();

        let records = tracker.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], updated);
        assert_eq!(records[1].module_id, "algebra");
    }

    #[tokio::test]
    async fn test_cache_matches_store_after_reload() {
        let (repo, tracker) = tracker("alice");

        tracker.complete_lesson("intro", "lesson-1").await.unwrap();
        tracker.complete_lesson("intro", "lesson-2").await.unwrap();
        tracker.record_quiz_score("intro", "lesson-2", 90.0).await.unwrap();

        let cached = tracker.module_progress("intro").await.unwrap();
        assert_eq!(repo.get("alice", "intro").await.unwrap(), Some(cached.clone()));
        assert_eq!(cached.completed_lessons.len(), 2);
        assert_eq!(cached.quiz_scores.get("lesson-2"), Some(&90.0));

        let fresh = ProgressTracker::new(repo, "alice");
        assert_eq!(fresh.load().await.unwrap(), 1);
        assert_eq!(fresh.module_progress("intro").await, Some(cached));
    }

    #[tokio::test]
    async fn test_load_ignores_other_users() {
        let (repo, tracker) = tracker("alice");
        repo.save(&ProgressRecord::new("bob", "intro")).await.unwrap();
        repo.save(&ProgressRecord::new("alice", "algebra")).await.unwrap();

        assert_eq!(tracker.load().await.unwrap(), 1);
        assert!(tracker.module_progress("intro").await.is_none());
        assert!(tracker.module_progress("algebra").await.is_some());
    }
}
