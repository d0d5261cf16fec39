//! Orchestrator: analyze, plan, execute, synthesize
//!
//! Groups run one after another and so do the tasks inside a group. A task
//! id runs at most once even if it is listed in several groups, and subtasks
//! no group mentions run last, in decomposition order.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::analyzer::TaskAnalyzer;
use super::delegation::DelegationManager;
use super::executor::SpecialistExecutor;
use super::prompts;
use super::router::Router;
use crate::agents::{
    DelegationDecision, ExecutionPlan, RosterKind, SpecialistRegistry, TaskDecomposition,
    TaskResult,
};
use crate::llm::LlmClient;
use crate::session::ConversationContext;
use crate::{Error, Result};

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct OrchestrationOutcome {
    pub response: String,
    pub decomposition: TaskDecomposition,
    pub execution_plan: ExecutionPlan,
    /// In execution order
    pub task_results: Vec<TaskResult>,
    /// Every delegation followed during the run, in order
    pub delegation_history: Vec<DelegationDecision>,
}

impl OrchestrationOutcome {
    pub fn result(&self, task_id: &str) -> Option<&TaskResult> {
        self.task_results.iter().find(|r| r.task_id == task_id)
    }

    /// Distinct specialists that produced results, in first-use order
    pub fn agents_used(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.task_results
            .iter()
            .filter(|r| seen.insert(r.agent.as_str()))
            .map(|r| r.agent.clone())
            .collect()
    }
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    roster: RosterKind,
    analyzer: TaskAnalyzer,
    router: Router,
    executor: SpecialistExecutor,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<SpecialistRegistry>,
        roster: RosterKind,
        max_depth: usize,
    ) -> Self {
        let delegation = DelegationManager::new(llm.clone(), roster).with_max_depth(max_depth);
        Self {
            analyzer: TaskAnalyzer::new(llm.clone(), roster),
            router: Router::new(llm.clone(), registry.clone(), roster),
            executor: SpecialistExecutor::new(registry, delegation),
            llm,
            roster,
        }
    }

    pub fn roster(&self) -> RosterKind {
        self.roster
    }

    /// Handle one query end to end. Any error aborts the run.
    #[tracing::instrument(skip(self, context), fields(roster = %self.roster))]
    pub async fn run(
        &self,
        query: &str,
        context: Option<&ConversationContext>,
    ) -> Result<OrchestrationOutcome> {
        let decomposition = self.analyzer.analyze(query, context).await?;
        let execution_plan = self.router.create_execution_plan(&decomposition).await?;

        let mut task_results = Vec::with_capacity(decomposition.subtasks.len());
        let mut delegation_history = Vec::new();
        let mut executed = HashSet::new();

        for group in execution_groups(&decomposition) {
            debug!(group = ?group, "executing group");
            for task_id in group {
                if !executed.insert(task_id.clone()) {
                    continue;
                }
                let assignment = execution_plan
                    .assignments
                    .get(&task_id)
                    .ok_or_else(|| Error::Other(format!("No assignment for task {}", task_id)))?;

                let (result, delegations) = self
                    .executor
                    .execute(&assignment.agent, &assignment.task)
                    .await?;
                task_results.push(result);
                delegation_history.extend(delegations);
            }
        }

        let response = self.synthesize(query, &task_results).await?;

        info!(
            subtasks = decomposition.subtasks.len(),
            delegations = delegation_history.len(),
            "orchestration complete"
        );

        Ok(OrchestrationOutcome {
            response,
            decomposition,
            execution_plan,
            task_results,
            delegation_history,
        })
    }

    async fn synthesize(&self, query: &str, results: &[TaskResult]) -> Result<String> {
        let entries: Vec<String> = results
            .iter()
            .map(|r| {
                prompts::synthesis_entry(self.roster, &r.task_id, &r.description, &r.agent, &r.result)
            })
            .collect();

        self.llm
            .ask(
                prompts::synthesis_system(self.roster),
                &prompts::synthesis_user(self.roster, query, &entries),
            )
            .await
    }
}

/// The decomposition's groups plus a trailing group of unlisted subtasks
fn execution_groups(decomposition: &TaskDecomposition) -> Vec<Vec<String>> {
    let mut groups = decomposition.parallel_groups.clone();
    let listed: HashSet<&String> = decomposition.parallel_groups.iter().flatten().collect();

    let trailing: Vec<String> = decomposition
        .subtasks
        .iter()
        .filter(|t| !listed.contains(&t.id))
        .map(|t| t.id.clone())
        .collect();
    if !trailing.is_empty() {
        groups.push(trailing);
    }
    groups
}
