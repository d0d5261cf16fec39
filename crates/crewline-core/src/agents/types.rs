//! Specialist and task types
//!
//! Defines the data that flows through orchestration:
//! - SubTask / TaskDecomposition: what the analyzer produces
//! - AgentCapability / SpecialistProfile: what a specialist can do
//! - TaskAssignment / ExecutionPlan: what the router decides
//! - DelegationDecision / TaskResult: what execution records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Closed set of task tags the analyzer may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Research,
    Analysis,
    Creative,
    Technical,
    Financial,
    Legal,
    PortfolioAnalysis,
    MarketResearch,
    InvestmentStrategy,
    ComplianceCheck,
    ClientCommunication,
    #[default]
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 12] = [
        TaskType::Research,
        TaskType::Analysis,
        TaskType::Creative,
        TaskType::Technical,
        TaskType::Financial,
        TaskType::Legal,
        TaskType::PortfolioAnalysis,
        TaskType::MarketResearch,
        TaskType::InvestmentStrategy,
        TaskType::ComplianceCheck,
        TaskType::ClientCommunication,
        TaskType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Creative => "creative",
            Self::Technical => "technical",
            Self::Financial => "financial",
            Self::Legal => "legal",
            Self::PortfolioAnalysis => "portfolio_analysis",
            Self::MarketResearch => "market_research",
            Self::InvestmentStrategy => "investment_strategy",
            Self::ComplianceCheck => "compliance_check",
            Self::ClientCommunication => "client_communication",
            Self::General => "general",
        }
    }

    /// Exact, case-sensitive match on the wire tag
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work produced by decomposition. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// 1..=5
    pub complexity: u8,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub required_tools: Vec<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
}

impl SubTask {
    pub fn new(id: impl Into<String>, description: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            task_type,
            complexity: 3,
            dependencies: vec![],
            required_tools: vec![],
            required_capabilities: vec![],
        }
    }

    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }
}

/// The analyzer's breakdown of one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDecomposition {
    pub original_query: String,
    /// Never empty
    pub subtasks: Vec<SubTask>,
    pub execution_order: Vec<String>,
    pub parallel_groups: Vec<Vec<String>>,
}

/// A named skill with a proficiency in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapability {
    pub name: String,
    pub description: String,
    pub proficiency: f64,
}

impl AgentCapability {
    pub fn new(name: impl Into<String>, description: impl Into<String>, proficiency: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            proficiency: proficiency.clamp(0.0, 1.0),
        }
    }
}

/// Static description of a specialist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistProfile {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Declaration order is kept for prompts
    pub capabilities: Vec<AgentCapability>,
    /// Names of the tools this specialist may invoke
    pub tools: Vec<String>,
}

impl SpecialistProfile {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: String::new(),
            backstory: String::new(),
            capabilities: vec![],
            tools: vec![],
        }
    }

    pub fn capability(mut self, name: &str, description: &str, proficiency: f64) -> Self {
        self.capabilities
            .push(AgentCapability::new(name, description, proficiency));
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn capability_names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn proficiency(&self, capability: &str) -> Option<f64> {
        self.capabilities
            .iter()
            .find(|c| c.name == capability)
            .map(|c| c.proficiency)
    }

    /// How well this specialist matches a set of required capabilities.
    ///
    /// 0.5 when nothing is required. Otherwise the sum of proficiencies of
    /// the matched capabilities divided by the number required, so unmatched
    /// requirements count as zero.
    pub fn capability_score(&self, required: &[String]) -> f64 {
        if required.is_empty() {
            return 0.5;
        }

        let total: f64 = required
            .iter()
            .filter_map(|name| self.proficiency(name))
            .sum();

        total / required.len() as f64
    }
}

/// A re-routing of a subtask between specialists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationDecision {
    pub from_agent: String,
    pub to_agent: String,
    pub task: SubTask,
    pub reason: String,
    pub confidence: f64,
}

/// Router output for one subtask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub agent: String,
    pub confidence: f64,
    pub task: SubTask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExecutionPlan {
    pub parallel_groups: Vec<Vec<String>>,
    pub assignments: HashMap<String, TaskAssignment>,
}

/// What a specialist produced for one subtask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub agent: String,
    pub task_id: String,
    pub description: String,
    pub result: String,
    pub tools_used: Vec<String>,
    pub delegation_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SpecialistProfile {
        SpecialistProfile::new("research_specialist", "Senior Research Analyst")
            .capability("web_research", "Finds information", 0.95)
            .capability("fact_checking", "Validates accuracy", 0.9)
    }

    fn caps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_task_type_wire_tags() {
        assert_eq!(TaskType::parse("portfolio_analysis"), Some(TaskType::PortfolioAnalysis));
        assert_eq!(TaskType::parse("general"), Some(TaskType::General));
        assert_eq!(TaskType::parse("Research"), None);
        assert_eq!(TaskType::parse("billing"), None);
        assert_eq!(
            serde_json::to_string(&TaskType::ClientCommunication).unwrap(),
            "\"client_communication\""
        );
        for t in TaskType::ALL {
            assert_eq!(TaskType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_capability_score_empty_requirements() {
        assert_eq!(profile().capability_score(&[]), 0.5);
        assert_eq!(SpecialistProfile::new("x", "y").capability_score(&[]), 0.5);
    }

    #[test]
    fn test_capability_score_is_mean_of_matches() {
        let p = profile();
        let score = p.capability_score(&caps(&["web_research", "fact_checking"]));
        assert!((score - 0.925).abs() < 1e-9);

        // Unmatched requirements dilute the mean
        let score = p.capability_score(&caps(&["web_research", "tax_planning"]));
        assert!((score - 0.475).abs() < 1e-9);
    }

    #[test]
    fn test_capability_score_no_match_is_zero() {
        assert_eq!(profile().capability_score(&caps(&["debugging"])), 0.0);
    }

    #[test]
    fn test_capability_proficiency_is_clamped() {
        let cap = AgentCapability::new("x", "y", 1.7);
        assert_eq!(cap.proficiency, 1.0);
    }

    #[test]
    fn test_subtask_serializes_type_field() {
        let task = SubTask::new("task_1", "Find news", TaskType::Research).with_tools(["search_web"]);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "research");
        assert_eq!(json["complexity"], 3);
        assert_eq!(json["required_tools"][0], "search_web");
    }
}
