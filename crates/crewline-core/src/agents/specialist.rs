//! Specialist trait and the default LLM-backed implementation

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{SpecialistProfile, SubTask};
use crate::llm::LlmClient;
use crate::tool::ToolManager;
use crate::Result;

/// A named role that can execute subtasks
#[async_trait]
pub trait Specialist: Send + Sync {
    fn profile(&self) -> &SpecialistProfile;

    fn name(&self) -> &str {
        &self.profile().name
    }

    fn role(&self) -> &str {
        &self.profile().role
    }

    /// See [`SpecialistProfile::capability_score`]
    fn capability_score(&self, required: &[String]) -> f64 {
        self.profile().capability_score(required)
    }

    /// Produce a free-text answer for the task. Errors propagate to the
    /// orchestrator and abort the run.
    async fn execute(&self, task: &SubTask) -> Result<String>;
}

/// Specialist that gathers tool observations and answers with one completion
pub struct LlmSpecialist {
    profile: SpecialistProfile,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolManager>,
}

impl LlmSpecialist {
    pub fn new(profile: SpecialistProfile, llm: Arc<dyn LlmClient>, tools: Arc<ToolManager>) -> Self {
        Self { profile, llm, tools }
    }

    /// Required tools this specialist is bound to and that are registered
    fn usable_tools<'a>(&'a self, task: &'a SubTask) -> impl Iterator<Item = &'a str> + 'a {
        task.required_tools
            .iter()
            .map(String::as_str)
            .filter(|name| self.profile.tools.iter().any(|t| t.as_str() == *name))
            .filter(|name| self.tools.contains(name))
    }

    async fn gather_observations(&self, task: &SubTask) -> Result<Vec<String>> {
        let mut observations = Vec::new();

        for name in self.usable_tools(task) {
            debug!(specialist = %self.profile.name, tool = name, "running tool");
            let result = self
                .tools
                .execute(name, JsonValue::String(task.description.clone()))
                .await?;

            let label = if result.is_error { "error" } else { "output" };
            observations.push(format!("[{} {}]\n{}", name, label, result.output));
        }

        Ok(observations)
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a {}.\nGoal: {}\nBackstory: {}",
            self.profile.role, self.profile.goal, self.profile.backstory
        )
    }

    fn task_prompt(task: &SubTask, observations: &[String]) -> String {
        let mut prompt = format!(
            "Task: {}\n\nExpected output: Complete analysis/answer for: {}",
            task.description, task.description
        );

        if !observations.is_empty() {
            prompt.push_str("\n\nTool observations:\n");
            prompt.push_str(&observations.join("\n\n"));
        }

        prompt
    }
}

#[async_trait]
impl Specialist for LlmSpecialist {
    fn profile(&self) -> &SpecialistProfile {
        &self.profile
    }

    #[tracing::instrument(skip(self, task), fields(specialist = %self.profile.name, task_id = %task.id))]
    async fn execute(&self, task: &SubTask) -> Result<String> {
        let observations = self.gather_observations(task).await?;
        info!(observations = observations.len(), "specialist answering");

        self.llm
            .ask(&self.system_prompt(), &Self::task_prompt(task, &observations))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::TaskType;
    use crate::llm::ScriptedLlm;
    use crate::tool::{Tool, ToolResult};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "search_web"
        }

        fn description(&self) -> &str {
            "Echo"
        }

        fn input_schema(&self) -> JsonValue {
            crate::tool::SchemaBuilder::single_string("query", "Query")
        }

        async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
            let query = crate::tool::string_input(&input, "query").unwrap_or_default();
            Ok(ToolResult::success(format!("results for {}", query)))
        }
    }

    fn profile() -> SpecialistProfile {
        SpecialistProfile::new("research_specialist", "Senior Research Analyst")
            .goal("Complete tasks that require web_research")
            .backstory("Expert Senior Research Analyst.")
            .capability("web_research", "Finds information", 0.95)
            .tools(["search_web"])
    }

    fn tools() -> Arc<ToolManager> {
        let mut manager = ToolManager::new();
        manager.register(Arc::new(EchoTool));
        Arc::new(manager)
    }

    #[tokio::test]
    async fn test_execute_runs_bound_tools_and_prompts_once() {
        let llm = Arc::new(ScriptedLlm::new(["final answer"]));
        let specialist = LlmSpecialist::new(profile(), llm.clone(), tools());

        let task = SubTask::new("task_1", "rust async runtimes", TaskType::Research)
            .with_tools(["search_web", "database_query"]);
        let answer = specialist.execute(&task).await.unwrap();

        assert_eq!(answer, "final answer");
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].system.contains("Senior Research Analyst"));
        assert!(prompts[0].system.contains("Goal: Complete tasks"));
        assert!(prompts[0].user.contains("[search_web output]"));
        assert!(prompts[0].user.contains("results for rust async runtimes"));
        assert!(!prompts[0].user.contains("database_query"));
    }

    #[tokio::test]
    async fn test_execute_without_required_tools() {
        let llm = Arc::new(ScriptedLlm::new(["ok"]));
        let specialist = LlmSpecialist::new(profile(), llm.clone(), tools());

        let task = SubTask::new("task_1", "summarize", TaskType::General);
        specialist.execute(&task).await.unwrap();

        assert!(!llm.prompts()[0].user.contains("Tool observations"));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()));
        llm.push_error("upstream down");
        let specialist = LlmSpecialist::new(profile(), llm, tools());

        let task = SubTask::new("task_1", "x", TaskType::General);
        assert!(specialist.execute(&task).await.is_err());
    }

    #[test]
    fn test_trait_defaults_delegate_to_profile() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()));
        let specialist = LlmSpecialist::new(profile(), llm, tools());
        assert_eq!(specialist.name(), "research_specialist");
        assert_eq!(specialist.role(), "Senior Research Analyst");
        assert_eq!(specialist.capability_score(&[]), 0.5);
    }
}
