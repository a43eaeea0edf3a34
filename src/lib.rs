//! Offnet - offline learning companion library
//!
//! The local data layer and tutor engine behind the Offnet learning app:
//! - Namespaced durable key-value store (SQLite)
//! - Lesson content with first-run seeding
//! - Per-user progress with merge-on-save semantics
//! - Single-flight local model lifecycle
//! - Rule-based tutor replies and practice exercises
//!
//! # Example
//!
//! ```ignore
//! use offnet::{App, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::open(&Config::load()?).await?;
//!     let modules = app.content.get_all_modules().await?;
//!     println!("{} modules", modules.len());
//!     println!("{}", app.engine.respond("What is a variable?").await);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod storage;
pub mod content;
pub mod progress;
pub mod users;
pub mod tutor;
pub mod config;
pub mod app;
pub mod cli;

pub use app::{App, StorageInfo};
pub use config::Config;
pub use content::{ContentModule, ContentRepository, Lesson};
pub use progress::{ProgressRecord, ProgressRepository, ProgressTracker};
pub use storage::{DurableStore, Namespace, SqliteStore, StorageError};
pub use tutor::{
    Exercise, ModelHandle, ModelLifecycleManager, ModelStatus, ResponseDelay, ResponseEngine, TutorSession,
};
pub use types::{ChatMessage, ChatRole};
pub use users::{FontSize, Preferences, UserProfile, UserRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
