//! Session management

use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{SessionConfig, StoreKind};
use crate::orchestration::{OrchestrationOutcome, Orchestrator};
use crate::session::{
    ContextStore, ConversationContext, FileContextStore, SqliteContextStore,
};
use crate::Result;

/// Turns summarized by [`SessionManager::relevant_context`]
const RELEVANT_TURNS: usize = 3;
/// Characters kept per side of a summarized turn
const EXCERPT_CHARS: usize = 100;
/// Characters of each task result kept in `task_outcomes`
const OUTCOME_CHARS: usize = 200;

/// Keyword rules: any term present in the lowercased query sets the preference
const PREFERENCE_RULES: &[(&[&str], &str, &str)] = &[
    (&["retirement", "pension", "401k"], "interest", "retirement_planning"),
    (&["esg", "sustainable", "impact"], "interest", "esg_investing"),
    (&["tax"], "interest", "tax_optimization"),
    (&["risk", "conservative", "volatile"], "risk_sensitivity", "high"),
];

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Owns one conversation context and the store it persists to
pub struct SessionManager {
    store: Arc<dyn ContextStore>,
    context: ConversationContext,
    max_context_turns: usize,
}

impl SessionManager {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn ContextStore>) -> Self {
        Self {
            store,
            context: ConversationContext::new(session_id),
            max_context_turns: 10,
        }
    }

    pub fn with_max_context_turns(mut self, max_context_turns: usize) -> Self {
        self.max_context_turns = max_context_turns;
        self
    }

    /// Build the configured store and load any saved context for `session_id`
    pub fn from_config(config: &SessionConfig, session_id: impl Into<String>) -> Result<Self> {
        let store: Arc<dyn ContextStore> = match config.store {
            StoreKind::File => Arc::new(FileContextStore::new(&config.dir)),
            StoreKind::Sqlite => Arc::new(SqliteContextStore::new(&config.db_path)?),
        };
        let mut manager =
            Self::new(session_id, store).with_max_context_turns(config.max_context_turns);
        manager.load()?;
        Ok(manager)
    }

    pub fn session_id(&self) -> &str {
        &self.context.conversation_id
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Record a turn, keeping only the last `max_context_turns`
    pub fn add_turn(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        metadata: Map<String, JsonValue>,
    ) {
        self.context.push_turn(input, output, metadata);
        self.context.trim_turns(self.max_context_turns);
    }

    pub fn update_preferences(&mut self, preferences: Map<String, JsonValue>) {
        self.context.user_preferences.extend(preferences);
    }

    /// Short summary of the last few turns, or an empty string
    pub fn relevant_context(&self) -> String {
        if self.context.is_empty() {
            return String::new();
        }

        let mut summary = String::from("Previous conversation:\n");
        for turn in self.context.recent_turns(RELEVANT_TURNS) {
            summary.push_str(&format!("User: {}...\n", excerpt(&turn.input, EXCERPT_CHARS)));
            summary.push_str(&format!(
                "Assistant: {}...\n\n",
                excerpt(&turn.output, EXCERPT_CHARS)
            ));
        }
        summary
    }

    /// Apply the keyword preference rules to `query`
    pub fn learn_preferences(&mut self, query: &str) {
        let lowered = query.to_lowercase();
        for (terms, key, value) in PREFERENCE_RULES {
            if terms.iter().any(|term| lowered.contains(term)) {
                debug!(key, value, "learned preference");
                self.context
                    .user_preferences
                    .insert(key.to_string(), JsonValue::String(value.to_string()));
            }
        }
    }

    /// Forget the conversation history
    pub fn clear(&mut self) {
        self.context.clear_history();
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.context)?;
        info!("Session saved: {}", self.session_id());
        Ok(())
    }

    /// Replace the in-memory context with the stored one, if any.
    /// Returns whether anything was found.
    pub fn load(&mut self) -> Result<bool> {
        match self.store.load(self.session_id())? {
            Some(context) => {
                info!("Session loaded: {} ({} turns)", self.session_id(), context.turn_count());
                self.context = context;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run `query` with this session's context and record the outcome
    #[tracing::instrument(skip(self, orchestrator), fields(session = %self.session_id()))]
    pub async fn process_inquiry(
        &mut self,
        orchestrator: &Orchestrator,
        query: &str,
    ) -> Result<OrchestrationOutcome> {
        if !self.context.is_empty() {
            debug!(context = %self.relevant_context(), "using previous conversation");
        }

        let outcome = orchestrator.run(query, Some(&self.context)).await?;
        let agents_used = outcome.agents_used();

        let mut metadata = Map::new();
        metadata.insert("subtasks".into(), json!(outcome.decomposition.subtasks.len()));
        metadata.insert("agents_used".into(), json!(agents_used));
        metadata.insert("delegations".into(), json!(outcome.delegation_history.len()));
        self.add_turn(query, outcome.response.as_str(), metadata);

        for result in &outcome.task_results {
            self.context.task_outcomes.insert(
                result.task_id.clone(),
                json!({
                    "agent": result.agent,
                    "description": result.description,
                    "excerpt": excerpt(&result.result, OUTCOME_CHARS),
                }),
            );
        }
        self.context.active_agents = agents_used;
        self.learn_preferences(query);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{RosterKind, Specialist, SpecialistProfile, SpecialistRegistry, SubTask};
    use crate::llm::ScriptedLlm;
    use crate::session::InMemoryContextStore;
    use async_trait::async_trait;

    fn manager() -> SessionManager {
        SessionManager::new("s1", Arc::new(InMemoryContextStore::new()))
    }

    #[test]
    fn test_add_turn_trims() {
        let mut manager = manager().with_max_context_turns(3);
        for i in 0..5 {
            manager.add_turn(format!("q{}", i), format!("a{}", i), Map::new());
        }
        let inputs: Vec<&str> = manager.context().turns.iter().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_relevant_context() {
        let mut manager = manager();
        assert_eq!(manager.relevant_context(), "");

        manager.add_turn("first", "one", Map::new());
        manager.add_turn("x".repeat(150), "two", Map::new());
        manager.add_turn("third", "three", Map::new());
        manager.add_turn("fourth", "four", Map::new());

        let summary = manager.relevant_context();
        assert!(summary.starts_with("Previous conversation:\n"));
        assert!(!summary.contains("first"));
        assert!(summary.contains(&format!("User: {}...\n", "x".repeat(100))));
        assert!(!summary.contains(&"x".repeat(101)));
        assert!(summary.ends_with("User: fourth...\nAssistant: four...\n\n"));
    }

    #[test]
    fn test_learn_preferences() {
        let mut manager = manager();
        manager.learn_preferences("How do I plan for RETIREMENT with low risk?");
        let prefs = &manager.context().user_preferences;
        assert_eq!(prefs["interest"], "retirement_planning");
        assert_eq!(prefs["risk_sensitivity"], "high");

        manager.learn_preferences("Any tax-efficient ideas?");
        assert_eq!(manager.context().user_preferences["interest"], "tax_optimization");

        manager.learn_preferences("hello");
        assert_eq!(manager.context().user_preferences.len(), 2);
    }

    #[test]
    fn test_update_preferences_merges() {
        let mut manager = manager();
        let mut prefs = Map::new();
        prefs.insert("interest".into(), json!("esg_investing"));
        manager.update_preferences(prefs);

        let mut more = Map::new();
        more.insert("horizon".into(), json!("10y"));
        manager.update_preferences(more);

        assert_eq!(manager.context().user_preferences.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());

        let mut first = SessionManager::new("s1", store.clone());
        first.add_turn("q", "a", Map::new());
        first.learn_preferences("esg funds");
        first.save().unwrap();

        let mut second = SessionManager::new("s1", store.clone());
        assert!(second.load().unwrap());
        assert_eq!(second.context(), first.context());

        let mut other = SessionManager::new("s2", store);
        assert!(!other.load().unwrap());
        assert!(other.context().is_empty());
    }

    #[test]
    fn test_from_config_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            max_context_turns: 2,
            ..Default::default()
        };

        let mut manager = SessionManager::from_config(&config, "s1").unwrap();
        for i in 0..3 {
            manager.add_turn(format!("q{}", i), "a", Map::new());
        }
        manager.save().unwrap();

        let reloaded = SessionManager::from_config(&config, "s1").unwrap();
        assert_eq!(reloaded.context().turn_count(), 2);
    }

    struct Echo(SpecialistProfile);

    #[async_trait]
    impl Specialist for Echo {
        fn profile(&self) -> &SpecialistProfile {
            &self.0
        }

        async fn execute(&self, task: &SubTask) -> Result<String> {
            Ok(format!("notes on {}", task.description))
        }
    }

    #[tokio::test]
    async fn test_process_inquiry_records_turn() {
        let mut registry = SpecialistRegistry::new();
        registry.register(Arc::new(Echo(SpecialistProfile::new(
            "wealth_strategist",
            "Wealth Strategist",
        ))));
        let llm = Arc::new(ScriptedLlm::new([
            "not valid json",
            r#"{"agent": "wealth_strategist", "confidence": 0.9}"#,
            "Here is your plan.",
        ]));
        let orchestrator =
            Orchestrator::new(llm.clone(), Arc::new(registry), RosterKind::WealthAdvisory, 0);

        let mut manager = manager();
        let query = "Should I move my pension into ESG funds?";
        let outcome = manager.process_inquiry(&orchestrator, query).await.unwrap();
        assert_eq!(outcome.response, "Here is your plan.");

        let context = manager.context();
        let turn = &context.turns[0];
        assert_eq!(turn.input, query);
        assert_eq!(turn.output, "Here is your plan.");
        assert_eq!(turn.metadata["subtasks"], 1);
        assert_eq!(turn.metadata["agents_used"], json!(["wealth_strategist"]));
        assert_eq!(turn.metadata["delegations"], 0);
        assert_eq!(context.active_agents, vec!["wealth_strategist"]);
        assert_eq!(context.task_outcomes["task_1"]["agent"], "wealth_strategist");
        assert_eq!(context.user_preferences["interest"], "esg_investing");

        // Second inquiry carries the first turn as history.
        llm.push_reply("not valid json");
        llm.push_reply(r#"{"agent": "wealth_strategist", "confidence": 0.9}"#);
        llm.push_reply("Again.");
        manager.process_inquiry(&orchestrator, "and now?").await.unwrap();
        assert!(llm.prompts()[3].user.contains("Client conversation history"));
        assert!(llm.prompts()[3].user.contains(query));
        assert_eq!(manager.context().turn_count(), 2);
    }
}
