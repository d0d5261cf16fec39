//! Task analyzer: query decomposition
//!
//! One completion turns a free-text query into subtasks. The reply is
//! decoded strictly; anything that fails validation is replaced by a
//! single-subtask fallback, so `analyze` only fails when the LLM call does.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::json::{self, Object};
use super::prompts;
use crate::agents::{RosterKind, SubTask, TaskDecomposition, TaskType};
use crate::error::DecodeError;
use crate::llm::LlmClient;
use crate::session::ConversationContext;
use crate::Result;

/// Turns of history attached to the analysis prompt
const HISTORY_TURNS: usize = 3;

pub struct TaskAnalyzer {
    llm: Arc<dyn LlmClient>,
    roster: RosterKind,
}

impl TaskAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, roster: RosterKind) -> Self {
        Self { llm, roster }
    }

    #[tracing::instrument(skip(self, context), fields(roster = %self.roster))]
    pub async fn analyze(
        &self,
        query: &str,
        context: Option<&ConversationContext>,
    ) -> Result<TaskDecomposition> {
        let history = context
            .map(|ctx| serde_json::to_string(ctx.recent_turns(HISTORY_TURNS)))
            .transpose()?;

        let system = prompts::analyzer_system(self.roster);
        let user = prompts::analyzer_user(self.roster, query, history.as_deref());
        debug!(prompt = %user, "requesting decomposition");

        let reply = self.llm.ask(&system, &user).await?;

        let decomposition = match decode_decomposition(query, &reply) {
            Ok(decomposition) => decomposition,
            Err(e) => {
                warn!("Failed to decode decomposition ({}), using fallback", e);
                fallback_decomposition(query, self.roster)
            }
        };

        info!(
            subtasks = decomposition.subtasks.len(),
            groups = decomposition.parallel_groups.len(),
            "query decomposed"
        );
        Ok(decomposition)
    }
}

/// Single general subtask wrapping the whole query
pub fn fallback_decomposition(query: &str, roster: RosterKind) -> TaskDecomposition {
    let task = SubTask::new("task_1", query, TaskType::General)
        .with_complexity(3)
        .with_tools([roster.fallback_tool()])
        .with_capabilities([roster.fallback_capability()]);

    TaskDecomposition {
        original_query: query.to_string(),
        execution_order: vec![task.id.clone()],
        parallel_groups: vec![vec![task.id.clone()]],
        subtasks: vec![task],
    }
}

/// Decode and validate a decomposition reply.
///
/// Every subtask needs `id`, `description`, a known `type` and an integer
/// `complexity` in 1..=5. Ids must be unique, and every id referenced by
/// `dependencies`, `execution_order` or `parallel_groups` must exist.
pub fn decode_decomposition(
    query: &str,
    text: &str,
) -> std::result::Result<TaskDecomposition, DecodeError> {
    let obj = json::extract_object(text)?;

    let raw_subtasks = json::required(&obj, "subtasks")?
        .as_array()
        .ok_or(DecodeError::WrongType {
            field: "subtasks",
            expected: "array",
        })?;
    if raw_subtasks.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut subtasks = Vec::with_capacity(raw_subtasks.len());
    let mut ids = HashSet::new();
    for raw in raw_subtasks {
        let raw = raw.as_object().ok_or(DecodeError::WrongType {
            field: "subtasks",
            expected: "array of objects",
        })?;
        let task = decode_subtask(raw)?;
        if !ids.insert(task.id.clone()) {
            return Err(DecodeError::DuplicateTaskId(task.id));
        }
        subtasks.push(task);
    }

    let known = |id: &String| -> std::result::Result<(), DecodeError> {
        if ids.contains(id) {
            Ok(())
        } else {
            Err(DecodeError::UnknownTaskId(id.clone()))
        }
    };

    for task in &subtasks {
        task.dependencies.iter().try_for_each(known)?;
    }

    let execution_order = match obj.get("execution_order").filter(|v| !v.is_null()) {
        Some(value) => json::string_list(value, "execution_order")?,
        None => subtasks.iter().map(|t| t.id.clone()).collect(),
    };
    execution_order.iter().try_for_each(known)?;

    let parallel_groups = match obj.get("parallel_groups").filter(|v| !v.is_null()) {
        Some(value) => value
            .as_array()
            .ok_or(DecodeError::WrongType {
                field: "parallel_groups",
                expected: "array of arrays",
            })?
            .iter()
            .map(|group| json::string_list(group, "parallel_groups"))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => subtasks.iter().map(|t| vec![t.id.clone()]).collect(),
    };
    parallel_groups.iter().flatten().try_for_each(known)?;

    Ok(TaskDecomposition {
        original_query: query.to_string(),
        subtasks,
        execution_order,
        parallel_groups,
    })
}

fn decode_subtask(raw: &Object) -> std::result::Result<SubTask, DecodeError> {
    let id = json::required_str(raw, "id")?.trim();
    if id.is_empty() {
        return Err(DecodeError::MissingField("id"));
    }
    let description = json::required_str(raw, "description")?;

    let tag = json::required_str(raw, "type")?;
    let task_type =
        TaskType::parse(tag).ok_or_else(|| DecodeError::UnknownTaskType(tag.to_string()))?;

    let complexity = json::required_i64(raw, "complexity")?;
    if !(1..=5).contains(&complexity) {
        return Err(DecodeError::ComplexityOutOfRange(complexity));
    }

    Ok(SubTask {
        id: id.to_string(),
        description: description.to_string(),
        task_type,
        complexity: complexity as u8,
        dependencies: json::optional_string_list(raw, "dependencies")?,
        required_tools: json::optional_string_list(raw, "required_tools")?,
        required_capabilities: json::optional_string_list(raw, "required_capabilities")?,
    })
}
