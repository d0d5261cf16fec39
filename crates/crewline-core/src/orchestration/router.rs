//! Router: specialist selection per subtask
//!
//! Capability scores rank every candidate; the model then picks one with a
//! confidence. If the pick cannot be decoded or names a non-candidate,
//! the highest score wins (first registered on ties).

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::json;
use super::prompts;
use crate::agents::{
    ExecutionPlan, RosterKind, Specialist, SpecialistRegistry, SubTask, TaskAssignment,
    TaskDecomposition,
};
use crate::error::DecodeError;
use crate::llm::LlmClient;
use crate::{Error, Result};

/// A decoded `{agent, confidence}` reply
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub agent: String,
    pub confidence: f64,
}

pub struct Router {
    llm: Arc<dyn LlmClient>,
    registry: Arc<SpecialistRegistry>,
    roster: RosterKind,
}

impl Router {
    pub fn new(llm: Arc<dyn LlmClient>, registry: Arc<SpecialistRegistry>, roster: RosterKind) -> Self {
        Self {
            llm,
            registry,
            roster,
        }
    }

    /// Pick the specialist for `task`.
    ///
    /// `candidates` restricts the choice to the named specialists; `None`
    /// means every registered one. Unknown names are skipped, and an empty
    /// candidate set is [`Error::NoCandidates`].
    #[tracing::instrument(skip(self, task, candidates), fields(task_id = %task.id))]
    pub async fn select(
        &self,
        task: &SubTask,
        candidates: Option<&[String]>,
    ) -> Result<(Arc<dyn Specialist>, f64)> {
        let pool: Vec<Arc<dyn Specialist>> = match candidates {
            None => self.registry.iter().cloned().collect(),
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let found = self.registry.get(name);
                    if found.is_none() {
                        warn!("Skipping unknown candidate: {}", name);
                    }
                    found
                })
                .collect(),
        };

        if pool.is_empty() {
            return Err(Error::NoCandidates(task.id.clone()));
        }

        let scored: Vec<(Arc<dyn Specialist>, f64)> = pool
            .into_iter()
            .map(|s| {
                let score = s.capability_score(&task.required_capabilities);
                (s, score)
            })
            .collect();

        let lines: Vec<String> = scored
            .iter()
            .map(|(s, score)| prompts::candidate_line(s.name(), s.role(), *score))
            .collect();
        debug!(candidates = ?lines, "capability scores");

        let reply = self
            .llm
            .ask(
                &prompts::router_system(self.roster),
                &prompts::router_user(self.roster, task, &lines),
            )
            .await?;

        let names: Vec<&str> = scored.iter().map(|(s, _)| s.name()).collect();
        match decode_selection(&reply, &names) {
            Ok(selection) => {
                let chosen = scored
                    .iter()
                    .find(|(s, _)| s.name() == selection.agent)
                    .map(|(s, _)| s.clone())
                    .ok_or_else(|| Error::UnknownSpecialist(selection.agent.clone()))?;
                info!(agent = %selection.agent, confidence = selection.confidence, "specialist selected");
                Ok((chosen, selection.confidence))
            }
            Err(e) => {
                warn!("Failed to decode specialist selection ({}), using capability scores", e);
                let (best, score) = best_scored(&scored);
                info!(agent = %best.name(), confidence = score, "specialist selected by score");
                Ok((best.clone(), score))
            }
        }
    }

    /// One selection per subtask, over every registered specialist
    #[tracing::instrument(skip(self, decomposition), fields(subtasks = decomposition.subtasks.len()))]
    pub async fn create_execution_plan(&self, decomposition: &TaskDecomposition) -> Result<ExecutionPlan> {
        let mut assignments = HashMap::with_capacity(decomposition.subtasks.len());

        for task in &decomposition.subtasks {
            let (specialist, confidence) = self.select(task, None).await?;
            assignments.insert(
                task.id.clone(),
                TaskAssignment {
                    agent: specialist.name().to_string(),
                    confidence,
                    task: task.clone(),
                },
            );
        }

        Ok(ExecutionPlan {
            parallel_groups: decomposition.parallel_groups.clone(),
            assignments,
        })
    }
}

/// Highest score; the earliest entry wins ties. `scored` must be non-empty.
fn best_scored(scored: &[(Arc<dyn Specialist>, f64)]) -> (&Arc<dyn Specialist>, f64) {
    let mut best = &scored[0];
    for entry in &scored[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    (&best.0, best.1)
}

/// Decode `{agent, confidence}`; `agent` must be one of `candidates`
pub fn decode_selection(text: &str, candidates: &[&str]) -> std::result::Result<Selection, DecodeError> {
    let obj = json::extract_object(text)?;
    let agent = json::required_str(&obj, "agent")?.trim();
    let confidence = json::required_confidence(&obj, "confidence")?;

    if !candidates.contains(&agent) {
        return Err(DecodeError::NotACandidate(agent.to_string()));
    }

    Ok(Selection {
        agent: agent.to_string(),
        confidence,
    })
}
