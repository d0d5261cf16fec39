//! Scripted LLM client for tests and offline runs
//!
//! Replies are consumed in order. Every call is recorded so tests can
//! assert on the prompts that were sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::LlmClient;
use super::types::Message;
use crate::error::{Error, Result};

/// A prompt as the scripted client saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` once the script is exhausted instead of failing
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        lock(&self.replies).push_back(Ok(text.into()));
    }

    /// Queue a transport failure
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.replies).push_back(Err(Error::Llm(message.into())));
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String> {
        let user = messages
            .iter()
            .map(Message::text_content)
            .collect::<Vec<_>>()
            .join("\n");
        lock(&self.prompts).push(RecordedPrompt {
            system: system.to_string(),
            user,
        });

        match lock(&self.replies).pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::Llm("scripted replies exhausted".to_string())),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_and_records_prompts() {
        let llm = ScriptedLlm::new(["first", "second"]);

        assert_eq!(llm.ask("sys", "one").await.unwrap(), "first");
        assert_eq!(llm.ask("sys", "two").await.unwrap(), "second");

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1].user, "two");
        assert_eq!(prompts[0].system, "sys");
    }

    #[tokio::test]
    async fn test_exhausted_script_is_an_error() {
        let llm = ScriptedLlm::new(Vec::<String>::new());
        assert!(matches!(llm.ask("s", "u").await, Err(Error::Llm(_))));
    }

    #[tokio::test]
    async fn test_fallback_and_queued_error() {
        let llm = ScriptedLlm::new(Vec::<String>::new()).with_fallback("ok");
        llm.push_error("boom");

        assert!(llm.ask("s", "u").await.is_err());
        assert_eq!(llm.ask("s", "u").await.unwrap(), "ok");
        assert_eq!(llm.call_count(), 2);
    }
}
