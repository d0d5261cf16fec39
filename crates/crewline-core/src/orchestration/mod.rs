//! Query orchestration
//!
//! ```text
//! query ──▶ TaskAnalyzer ──▶ Router ──▶ SpecialistExecutor ──▶ synthesis
//!             (decompose)   (assign)    (delegate + execute)
//! ```
//!
//! Every model reply is decoded into a typed value or replaced by an
//! explicit fallback; see [`json`] for the shared extraction helpers.

pub mod analyzer;
pub mod delegation;
pub mod executor;
pub mod json;
pub mod orchestrator;
pub mod prompts;
pub mod router;

pub use analyzer::{decode_decomposition, fallback_decomposition, TaskAnalyzer};
pub use delegation::{decode_delegation, DelegationManager, DEFAULT_MAX_DEPTH};
pub use executor::SpecialistExecutor;
pub use orchestrator::{OrchestrationOutcome, Orchestrator};
pub use router::{decode_selection, Router, Selection};
