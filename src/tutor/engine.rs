//! Tutor response engine
//!
//! Replies come from the keyword decision table in [`rules`](super::rules).
//! The local model is loaded best-effort on each request, but it is a
//! placeholder and always defers to the rules.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::exercises::{self, Exercise};
use super::model::{ModelLifecycleManager, ModelStatus};
use super::rules::{self, ResponseRule};

/// Bounds of the simulated inference latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDelay {
    min: Duration,
    max: Duration,
}

impl ResponseDelay {
    /// Uniform delay in `[min_ms, max_ms]`; the bounds may be given in either order
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms.min(max_ms)),
            max: Duration::from_millis(min_ms.max(max_ms)),
        }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = rand::rng().random_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for ResponseDelay {
    fn default() -> Self {
        Self::from_millis(500, 1500)
    }
}

pub struct ResponseEngine {
    model: Arc<ModelLifecycleManager>,
    rules: Vec<ResponseRule>,
    delay: ResponseDelay,
}

impl ResponseEngine {
    /// Engine using the built-in rule table
    pub fn new(model: Arc<ModelLifecycleManager>, delay: ResponseDelay) -> Self {
        Self::with_rules(model, rules::default_rules(), delay)
    }

    pub fn with_rules(model: Arc<ModelLifecycleManager>, rules: Vec<ResponseRule>, delay: ResponseDelay) -> Self {
        Self { model, rules, delay }
    }

    pub fn model(&self) -> &Arc<ModelLifecycleManager> {
        &self.model
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    /// Reply to a learner's question. Always returns usable text.
    pub async fn respond(&self, question: &str) -> String {
        let status = self.model.ensure_loaded().await;
        if status != ModelStatus::Loaded {
            debug!("Model unavailable ({}), answering from rules", status);
        }

        self.delay.wait().await;

        match rules::find_rule(&self.rules, question) {
            Some(rule) => {
                debug!("Matched tutor rule '{}'", rule.topic);
                rule.response.to_string()
            }
            None => rules::fallback_response(question),
        }
    }

    /// Practice exercise for a topic; unknown topics get the default exercise
    pub async fn exercise(&self, topic: &str) -> Exercise {
        self.delay.wait().await;
        exercises::exercise_for(topic)
    }
}
