//! Conversation sessions
//!
//! A session is one [`ConversationContext`] plus the [`ContextStore`] it is
//! saved to. [`SessionManager::process_inquiry`] ties a session to an
//! orchestrator run.

mod manager;
mod store;
mod types;

pub use manager::SessionManager;
pub use store::{ContextStore, FileContextStore, InMemoryContextStore, SqliteContextStore};
pub use types::{ConversationContext, ConversationTurn};
