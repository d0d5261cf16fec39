//! Error types for crewline-core

use thiserror::Error;

/// Main error type for crewline-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM API error: {0}")]
    Llm(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("No candidate specialists available for task {0}")]
    NoCandidates(String),

    #[error("Unknown specialist: {0}")]
    UnknownSpecialist(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for crewline-core
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to turn a model reply into one of the typed contracts
/// (decomposition, selection, delegation decision).
///
/// These never escape the orchestration layer: each call site maps them
/// onto its fallback value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("no JSON object found in model reply")]
    NoJson,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unknown task type `{0}`")]
    UnknownTaskType(String),

    #[error("complexity {0} is outside 1..=5")]
    ComplexityOutOfRange(i64),

    #[error("confidence {0} is outside 0..=1")]
    ConfidenceOutOfRange(f64),

    #[error("decomposition contains no subtasks")]
    Empty,

    #[error("duplicate subtask id `{0}`")]
    DuplicateTaskId(String),

    #[error("reference to unknown subtask id `{0}`")]
    UnknownTaskId(String),

    #[error("`{0}` is not one of the candidate specialists")]
    NotACandidate(String),
}
