//! Specialist executor
//!
//! Runs one subtask on its assigned specialist, following any delegation
//! chain first. The chain is an explicit loop: each hop increments the
//! depth, and the delegation manager stops answering at `max_depth`.

use std::sync::Arc;
use tracing::{info, warn};

use super::delegation::DelegationManager;
use crate::agents::{DelegationDecision, SpecialistRegistry, SubTask, TaskResult};
use crate::{Error, Result};

pub struct SpecialistExecutor {
    registry: Arc<SpecialistRegistry>,
    delegation: DelegationManager,
}

impl SpecialistExecutor {
    pub fn new(registry: Arc<SpecialistRegistry>, delegation: DelegationManager) -> Self {
        Self {
            registry,
            delegation,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.delegation.max_depth()
    }

    /// Execute `task` starting at `agent_name`.
    ///
    /// Returns the result together with the delegations that were followed,
    /// in order. A delegation to the current specialist is a hop like any
    /// other. A delegation to an unregistered name ends the chain and is not
    /// recorded.
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn execute(
        &self,
        agent_name: &str,
        task: &SubTask,
    ) -> Result<(TaskResult, Vec<DelegationDecision>)> {
        let mut current = self
            .registry
            .get(agent_name)
            .ok_or_else(|| Error::UnknownSpecialist(agent_name.to_string()))?;
        let mut depth = 0;
        let mut chain = Vec::new();

        loop {
            let decision = self
                .delegation
                .maybe_delegate(current.as_ref(), task, depth)
                .await?;
            let Some(decision) = decision else {
                break;
            };
            let Some(next) = self.registry.get(&decision.to_agent) else {
                warn!("Discarding delegation to unknown specialist: {}", decision.to_agent);
                break;
            };

            info!(
                from = %decision.from_agent,
                to = %decision.to_agent,
                depth = depth + 1,
                "delegating"
            );
            chain.push(decision);
            current = next;
            depth += 1;
        }

        let result = current.execute(task).await?;

        Ok((
            TaskResult {
                agent: current.name().to_string(),
                task_id: task.id.clone(),
                description: task.description.clone(),
                result,
                tools_used: task.required_tools.clone(),
                delegation_depth: depth,
            },
            chain,
        ))
    }
}
