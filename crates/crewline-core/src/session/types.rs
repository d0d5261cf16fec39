//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One query and the response it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub output: String,
    /// Run summary (`subtasks`, `agents_used`, `delegations`)
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

/// Everything remembered about one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub conversation_id: String,
    #[serde(default)]
    pub turns: Vec<ConversationTurn>,
    /// Learned preferences such as `interest` or `risk_sensitivity`
    #[serde(default)]
    pub user_preferences: Map<String, JsonValue>,
    /// Latest outcome per task id
    #[serde(default)]
    pub task_outcomes: Map<String, JsonValue>,
    /// Specialists involved in the latest turn
    #[serde(default)]
    pub active_agents: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            turns: Vec::new(),
            user_preferences: Map::new(),
            task_outcomes: Map::new(),
            active_agents: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Append a turn stamped with the current time
    pub fn push_turn(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        metadata: Map<String, JsonValue>,
    ) {
        let now = Utc::now();
        self.turns.push(ConversationTurn {
            timestamp: now,
            input: input.into(),
            output: output.into(),
            metadata,
        });
        self.updated_at = now;
    }

    /// Drop the oldest turns so at most `max` remain
    pub fn trim_turns(&mut self, max: usize) {
        if self.turns.len() > max {
            let excess = self.turns.len() - max;
            self.turns.drain(..excess);
        }
    }

    /// The last `n` turns, oldest first
    pub fn recent_turns(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Forget turns and outcomes; preferences are kept
    pub fn clear_history(&mut self) {
        self.turns.clear();
        self.task_outcomes.clear();
        self.active_agents.clear();
        self.updated_at = Utc::now();
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_creation() {
        let context = ConversationContext::new("20240101_120000");
        assert_eq!(context.conversation_id, "20240101_120000");
        assert!(context.is_empty());
        assert!(context.user_preferences.is_empty());
    }

    #[test]
    fn test_recent_and_trim() {
        let mut context = ConversationContext::new("s");
        for i in 0..5 {
            context.push_turn(format!("q{}", i), format!("a{}", i), Map::new());
        }

        let recent: Vec<&str> = context.recent_turns(2).iter().map(|t| t.input.as_str()).collect();
        assert_eq!(recent, vec!["q3", "q4"]);
        assert_eq!(context.recent_turns(10).len(), 5);

        context.trim_turns(3);
        assert_eq!(context.turn_count(), 3);
        assert_eq!(context.turns[0].input, "q2");
    }

    #[test]
    fn test_clear_history_keeps_preferences() {
        let mut context = ConversationContext::new("s");
        context.push_turn("q", "a", Map::new());
        context.user_preferences.insert("interest".into(), json!("esg_investing"));
        context.active_agents.push("wealth_strategist".into());

        context.clear_history();
        assert!(context.is_empty());
        assert!(context.active_agents.is_empty());
        assert_eq!(context.user_preferences["interest"], "esg_investing");
    }

    #[test]
    fn test_serde_shape() {
        let mut context = ConversationContext::new("s");
        let mut metadata = Map::new();
        metadata.insert("subtasks".into(), json!(2));
        context.push_turn("q", "a", metadata);

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["turns"][0]["input"], "q");
        assert_eq!(value["turns"][0]["metadata"]["subtasks"], 2);

        let back: ConversationContext = serde_json::from_value(value).unwrap();
        assert_eq!(back, context);
    }
}
