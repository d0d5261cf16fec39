//! LLM client layer
//!
//! Supports both the Anthropic Messages API and OpenAI-compatible APIs.

mod client;
mod mock;
mod traits;
mod types;

pub use client::HttpLlmClient;
pub use mock::{RecordedPrompt, ScriptedLlm};
pub use traits::LlmClient;
pub use types::*;
