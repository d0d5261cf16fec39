//! Delegation manager
//!
//! Before a specialist runs a subtask the model may hand it to someone
//! else. Depth is bounded: at `depth >= max_depth` no question is asked.
//! Undecodable replies mean "keep the task".

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::json;
use super::prompts;
use crate::agents::{DelegationDecision, RosterKind, Specialist, SubTask};
use crate::error::DecodeError;
use crate::llm::LlmClient;
use crate::Result;

pub const DEFAULT_MAX_DEPTH: usize = 5;

pub struct DelegationManager {
    llm: Arc<dyn LlmClient>,
    roster: RosterKind,
    max_depth: usize,
}

impl DelegationManager {
    pub fn new(llm: Arc<dyn LlmClient>, roster: RosterKind) -> Self {
        Self {
            llm,
            roster,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Ask whether `agent` should hand `task` to another specialist.
    ///
    /// Returns `None` without calling the model once `depth >= max_depth`.
    /// The target name is not checked against any registry here.
    #[tracing::instrument(skip(self, agent, task), fields(agent = %agent.name(), task_id = %task.id))]
    pub async fn maybe_delegate(
        &self,
        agent: &dyn Specialist,
        task: &SubTask,
        depth: usize,
    ) -> Result<Option<DelegationDecision>> {
        if depth >= self.max_depth {
            debug!(depth, max_depth = self.max_depth, "delegation depth exhausted");
            return Ok(None);
        }

        let reply = self
            .llm
            .ask(
                &prompts::delegation_system(self.roster),
                &prompts::delegation_user(self.roster, agent.profile(), task),
            )
            .await?;

        match decode_delegation(&reply, agent.name(), task) {
            Ok(Some(decision)) => {
                info!(to = %decision.to_agent, reason = %decision.reason, "delegation proposed");
                Ok(Some(decision))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Failed to decode delegation decision ({}), proceeding without delegation", e);
                Ok(None)
            }
        }
    }
}

/// Decode `{should_delegate, to_agent, reason, confidence}`.
///
/// `should_delegate: false` or a null/blank `to_agent` decode to `Ok(None)`.
/// When delegating, `reason` and a `confidence` in [0, 1] are required.
pub fn decode_delegation(
    text: &str,
    from_agent: &str,
    task: &SubTask,
) -> std::result::Result<Option<DelegationDecision>, DecodeError> {
    let obj = json::extract_object(text)?;

    if !json::required_bool(&obj, "should_delegate")? {
        return Ok(None);
    }
    let Some(to_agent) = json::optional_str(&obj, "to_agent")? else {
        return Ok(None);
    };

    Ok(Some(DelegationDecision {
        from_agent: from_agent.to_string(),
        to_agent: to_agent.to_string(),
        task: task.clone(),
        reason: json::required_str(&obj, "reason")?.to_string(),
        confidence: json::required_confidence(&obj, "confidence")?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{SpecialistProfile, TaskType};
    use crate::llm::ScriptedLlm;
    use async_trait::async_trait;

    struct StubSpecialist(SpecialistProfile);

    #[async_trait]
    impl Specialist for StubSpecialist {
        fn profile(&self) -> &SpecialistProfile {
            &self.0
        }

        async fn execute(&self, _task: &SubTask) -> Result<String> {
            Ok(String::new())
        }
    }

    fn agent() -> StubSpecialist {
        StubSpecialist(
            SpecialistProfile::new("data_analyst", "Senior Data Analyst")
                .capability("statistical_analysis", "Stats", 0.9),
        )
    }

    fn task() -> SubTask {
        SubTask::new("task_1", "Draft a contract", TaskType::Legal)
            .with_capabilities(["contract_review"])
    }

    const DELEGATE: &str = r#"{"should_delegate": true, "to_agent": "legal_advisor", "reason": "needs counsel", "confidence": 0.9}"#;

    #[test]
    fn test_decode_delegation() {
        let decision = decode_delegation(DELEGATE, "data_analyst", &task()).unwrap().unwrap();
        assert_eq!(decision.from_agent, "data_analyst");
        assert_eq!(decision.to_agent, "legal_advisor");
        assert_eq!(decision.reason, "needs counsel");
        assert_eq!(decision.confidence, 0.9);
        assert_eq!(decision.task.id, "task_1");

        let keep = r#"{"should_delegate": false, "to_agent": null, "reason": "fine", "confidence": 0.8}"#;
        assert_eq!(decode_delegation(keep, "a", &task()), Ok(None));

        let nobody = r#"{"should_delegate": true, "to_agent": "", "reason": "?", "confidence": 0.8}"#;
        assert_eq!(decode_delegation(nobody, "a", &task()), Ok(None));

        let no_reason = r#"{"should_delegate": true, "to_agent": "b", "confidence": 0.8}"#;
        assert_eq!(
            decode_delegation(no_reason, "a", &task()),
            Err(DecodeError::MissingField("reason"))
        );

        let stringly = r#"{"should_delegate": "yes", "to_agent": "b"}"#;
        assert!(decode_delegation(stringly, "a", &task()).is_err());
    }

    #[tokio::test]
    async fn test_maybe_delegate_returns_decision() {
        let llm = Arc::new(ScriptedLlm::new([DELEGATE]));
        let manager = DelegationManager::new(llm.clone(), RosterKind::General);

        let decision = manager.maybe_delegate(&agent(), &task(), 0).await.unwrap();
        assert_eq!(decision.unwrap().to_agent, "legal_advisor");

        let prompt = &llm.prompts()[0];
        assert!(prompt.user.starts_with("Current agent: data_analyst (Senior Data Analyst)"));
        assert!(prompt.user.contains("Agent capabilities: ['statistical_analysis']"));
        assert!(prompt.system.contains("'should_delegate' (bool)"));
    }

    #[tokio::test]
    async fn test_maybe_delegate_depth_bound_skips_model() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()).with_fallback(DELEGATE));
        let manager = DelegationManager::new(llm.clone(), RosterKind::General).with_max_depth(2);

        for depth in [2, 3, 10] {
            assert!(manager.maybe_delegate(&agent(), &task(), depth).await.unwrap().is_none());
        }
        assert_eq!(llm.call_count(), 0);

        assert!(manager.maybe_delegate(&agent(), &task(), 1).await.unwrap().is_some());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_maybe_delegate_garbage_is_no_delegation() {
        let llm = Arc::new(ScriptedLlm::new(["delegate to legal please"]));
        let manager = DelegationManager::new(llm, RosterKind::General);
        assert!(manager.maybe_delegate(&agent(), &task(), 0).await.unwrap().is_none());
    }

    #[test]
    fn test_default_max_depth() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()));
        assert_eq!(DelegationManager::new(llm, RosterKind::General).max_depth(), 5);
    }
}
