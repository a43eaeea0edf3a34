//! Local tutor: model lifecycle, rule-based replies and practice exercises

pub mod engine;
pub mod exercises;
pub mod model;
pub mod rules;
pub mod session;

pub use engine::{ResponseDelay, ResponseEngine};
pub use exercises::Exercise;
pub use model::{ModelDescriptor, ModelHandle, ModelLifecycleManager, ModelLoadError, ModelStatus};
pub use rules::ResponseRule;
pub use session::TutorSession;
