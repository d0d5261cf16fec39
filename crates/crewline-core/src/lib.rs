//! crewline-core: multi-agent orchestration core library
//!
//! Decomposes a query into subtasks, routes each to a specialist, follows
//! bounded delegation chains and synthesizes one response. Also provides
//! the LLM client, tool system, conversation sessions and evaluation.

pub mod agents;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod orchestration;
pub mod session;
pub mod tool;

pub use agents::{
    DelegationDecision, LlmSpecialist, RosterKind, Specialist, SpecialistProfile,
    SpecialistRegistry, SubTask, TaskDecomposition, TaskResult, TaskType,
};
pub use config::{Config, LlmConfig, LlmProvider, OrchestratorConfig, SessionConfig, StoreKind};
pub use error::{DecodeError, Error, Result};
pub use evaluation::{EvaluationSummary, Evaluator, Scenario, ScenarioReport};
pub use llm::{HttpLlmClient, LlmClient, Message, ScriptedLlm};
pub use orchestration::{OrchestrationOutcome, Orchestrator};
pub use session::{ContextStore, ConversationContext, SessionManager};
pub use tool::{Tool, ToolManager, ToolResult};
