//! Ephemeral tutoring conversation

use std::sync::Arc;

use super::engine::ResponseEngine;
use crate::types::ChatMessage;

/// A chat transcript that lives for one session and is never persisted
pub struct TutorSession {
    engine: Arc<ResponseEngine>,
    messages: Vec<ChatMessage>,
}

impl TutorSession {
    pub fn new(engine: Arc<ResponseEngine>) -> Self {
        Self {
            engine,
            messages: Vec::new(),
        }
    }

    /// Ask a question and record both sides of the exchange.
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn ask(&mut self, question: &str) -> Option<String> {
        if question.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(question));
        let reply = self.engine.respond(question).await;
        self.messages.push(ChatMessage::assistant(reply.clone()));

        Some(reply)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
