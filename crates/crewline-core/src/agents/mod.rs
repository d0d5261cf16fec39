//! Specialist agents
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   SpecialistRegistry                       │
//! │  ┌────────────┐  ┌────────────┐         ┌────────────┐    │
//! │  │ Specialist │  │ Specialist │   ...   │ Specialist │    │
//! │  └─────┬──────┘  └─────┬──────┘         └─────┬──────┘    │
//! └────────┼───────────────┼──────────────────────┼───────────┘
//!          │               │                      │
//!          ▼               ▼                      ▼
//!   SpecialistProfile: role, capabilities (proficiency 0..1), tools
//! ```
//!
//! Rosters are the static capability tables a registry is built from.
//! Orchestration (analysis, routing, delegation) lives in
//! [`crate::orchestration`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crewline_core::agents::{RosterKind, SpecialistRegistry};
//!
//! let registry = SpecialistRegistry::from_roster(RosterKind::General, llm, tools);
//! let analyst = registry.get("data_analyst").unwrap();
//! let score = analyst.capability_score(&["statistical_analysis".into()]);
//! ```

pub mod registry;
pub mod roster;
pub mod specialist;
pub mod types;

pub use registry::SpecialistRegistry;
pub use roster::RosterKind;
pub use specialist::{LlmSpecialist, Specialist};
pub use types::{
    AgentCapability, DelegationDecision, ExecutionPlan, SpecialistProfile, SubTask,
    TaskAssignment, TaskDecomposition, TaskResult, TaskType,
};
