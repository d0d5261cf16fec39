//! LLM client abstraction
//!
//! Every component that talks to a model receives an `Arc<dyn LlmClient>`
//! at construction time. `HttpLlmClient` talks to a real endpoint;
//! `ScriptedLlm` replays canned replies in tests.

use async_trait::async_trait;

use super::types::Message;
use crate::error::Result;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Non-streaming completion: one system prompt plus the conversation,
    /// returning the model's text.
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String>;

    /// Convenience for the common single-user-message call
    async fn ask(&self, system: &str, user: &str) -> Result<String> {
        self.complete(system, &[Message::user(user)]).await
    }

    /// Model identifier, for logging
    fn model(&self) -> &str {
        "unknown"
    }
}
