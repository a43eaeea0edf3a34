//! Learning progress persistence
//!
//! One [`ProgressRecord`] exists per `(user, module)` pair, stored under the key
//! `"{user_id}-{module_id}"`. Saving an existing pair replaces it.

pub mod tracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::content::ContentModule;
use crate::storage::{self, DurableStore, Namespace, StorageError};

pub use tracker::ProgressTracker;

/// A user's progress through one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub module_id: String,
    pub completed_lessons: BTreeSet<String>,
    /// Lesson id -> score
    pub quiz_scores: BTreeMap<String, f64>,
    pub last_accessed: DateTime<Utc>,
}

impl ProgressRecord {
    /// Fresh record with nothing completed
    pub fn new(user_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            module_id: module_id.into(),
            completed_lessons: BTreeSet::new(),
            quiz_scores: BTreeMap::new(),
            last_accessed: Utc::now(),
        }
    }

    /// Storage key for this record
    pub fn key(&self) -> String {
        progress_key(&self.user_id, &self.module_id)
    }

    /// Mark a lesson completed. Returns false if it already was.
    pub fn complete_lesson(&mut self, lesson_id: impl Into<String>) -> bool {
        self.last_accessed = Utc::now();
        self.completed_lessons.insert(lesson_id.into())
    }

    /// Record (or overwrite) a quiz score for a lesson
    pub fn record_quiz_score(&mut self, lesson_id: impl Into<String>, score: f64) {
        self.last_accessed = Utc::now();
        self.quiz_scores.insert(lesson_id.into(), score);
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    /// Fraction of the module's lessons completed, in `[0.0, 1.0]`.
    ///
    /// Completed ids that no longer exist in the module are ignored.
    pub fn completion_ratio(&self, module: &ContentModule) -> f64 {
        if module.lessons.is_empty() {
            return 0.0;
        }

        let done = module
            .lessons
            .iter()
            .filter(|lesson| self.completed_lessons.contains(&lesson.id))
            .count();

        done as f64 / module.lessons.len() as f64
    }
}

/// Storage key for a `(user, module)` pair
pub fn progress_key(user_id: &str, module_id: &str) -> String {
    format!("{}-{}", user_id, module_id)
}

/// Read/write access to progress records
pub struct ProgressRepository {
    store: Arc<dyn DurableStore>,
}

impl ProgressRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Upsert the record for its `(user, module)` pair
    pub async fn save(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        storage::put_record(self.store.as_ref(), Namespace::Progress, &record.key(), record).await
    }

    /// Direct lookup of one pair
    pub async fn get(&self, user_id: &str, module_id: &str) -> Result<Option<ProgressRecord>, StorageError> {
        storage::get_record(self.store.as_ref(), Namespace::Progress, &progress_key(user_id, module_id)).await
    }

    /// Every record belonging to `user_id` (linear scan, no ordering)
    pub async fn get_all(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let owned_by_user = |value: &Value| value.get("userId").and_then(Value::as_str) == Some(user_id);
        storage::collect_records(self.store.as_ref(), Namespace::Progress, &owned_by_user).await
    }
}
