//! Offline evaluation against canned scenarios
//!
//! Each scenario runs through [`SessionManager::process_inquiry`] in a fresh
//! in-memory session. A failing scenario is reported, not propagated.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::RosterKind;
use crate::orchestration::Orchestrator;
use crate::session::{InMemoryContextStore, SessionManager};

/// One query and the specialists a good run should involve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub query: String,
    pub expected_agents: Vec<String>,
    pub scenario_type: String,
    /// `high` or `medium`
    pub complexity: String,
}

impl Scenario {
    fn new(query: &str, expected_agents: &[&str], scenario_type: &str, complexity: &str) -> Self {
        Self {
            query: query.to_string(),
            expected_agents: expected_agents.iter().map(|a| a.to_string()).collect(),
            scenario_type: scenario_type.to_string(),
            complexity: complexity.to_string(),
        }
    }
}

/// Built-in scenarios for a roster
pub fn dataset(roster: RosterKind) -> Vec<Scenario> {
    match roster {
        RosterKind::General => vec![
            Scenario::new(
                "Analyze the financial performance of Commonwealth Bank over the last 5 years and identify key growth drivers",
                &["financial_advisor", "data_analyst", "research_specialist"],
                "financial_analysis",
                "high",
            ),
            Scenario::new(
                "Research the latest AI regulations in Australia and their potential impact on banking technology",
                &["research_specialist", "legal_advisor"],
                "regulatory_research",
                "medium",
            ),
            Scenario::new(
                "Design a mobile banking app architecture that supports real-time fraud detection",
                &["technical_expert", "financial_advisor"],
                "system_design",
                "high",
            ),
            Scenario::new(
                "Create a marketing campaign for a new sustainable investment product targeting millennials",
                &["creative_writer", "financial_advisor", "research_specialist"],
                "creative",
                "medium",
            ),
            Scenario::new(
                "What are the tax implications of crypto investments for Australian retail investors?",
                &["financial_advisor", "legal_advisor"],
                "tax_research",
                "medium",
            ),
        ],
        RosterKind::WealthAdvisory => vec![
            Scenario::new(
                "Review the Smith family portfolio and recommend rebalancing strategies given their upcoming retirement in 5 years. They currently have a 70/30 equity-bond split with significant concentration in tech stocks.",
                &["quantitative_analyst", "wealth_strategist"],
                "portfolio_review",
                "high",
            ),
            Scenario::new(
                "Analyze the impact of the Federal Reserve's recent interest rate decisions on our clients' fixed income allocations. What adjustments should we recommend for clients with significant bond exposure?",
                &["market_intelligence_analyst", "wealth_strategist"],
                "market_analysis",
                "medium",
            ),
            Scenario::new(
                "Recommend suitable ESG-focused investment options for a risk-averse high-net-worth client with $5M AUM who wants to align their portfolio with environmental and social values while maintaining capital preservation.",
                &["wealth_strategist", "regulatory_compliance_officer", "market_intelligence_analyst"],
                "investment_recommendation",
                "high",
            ),
            Scenario::new(
                "Verify the suitability of a concentrated stock position (40% in single company) for a client with a moderate risk profile and 15-year investment horizon. What are the compliance considerations and recommended actions?",
                &["regulatory_compliance_officer", "quantitative_analyst"],
                "compliance_review",
                "high",
            ),
            Scenario::new(
                "Draft a quarterly investment review letter for our wealth management clients explaining recent market volatility, our portfolio positioning, and outlook for the next quarter. The tone should be reassuring yet professional.",
                &["client_communications_specialist", "market_intelligence_analyst"],
                "client_communication",
                "medium",
            ),
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_type: String,
    pub query: String,
    pub response: Option<String>,
    pub subtasks_count: usize,
    pub agents_used: Vec<String>,
    pub delegation_count: usize,
    /// Share of expected agents that took part, in [0, 1]
    pub recall: f64,
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub reports: Vec<ScenarioReport>,
    /// Failed scenarios count as zero
    pub mean_recall: f64,
    pub failures: usize,
}

/// Fraction of `expected` present in `used`; 1.0 when nothing is expected
pub fn expected_agent_recall(expected: &[String], used: &[String]) -> f64 {
    if expected.is_empty() {
        return 1.0;
    }
    let used: HashSet<&str> = used.iter().map(String::as_str).collect();
    let hits = expected.iter().filter(|a| used.contains(a.as_str())).count();
    hits as f64 / expected.len() as f64
}

pub struct Evaluator {
    orchestrator: Arc<Orchestrator>,
}

impl Evaluator {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    #[tracing::instrument(skip_all, fields(scenarios = scenarios.len()))]
    pub async fn run(&self, scenarios: &[Scenario]) -> EvaluationSummary {
        let mut reports = Vec::with_capacity(scenarios.len());

        for (i, scenario) in scenarios.iter().enumerate() {
            info!("Scenario {}/{} [{}]", i + 1, scenarios.len(), scenario.scenario_type);
            reports.push(self.run_scenario(scenario).await);
        }

        let failures = reports.iter().filter(|r| r.is_failure()).count();
        let mean_recall = if reports.is_empty() {
            0.0
        } else {
            reports.iter().map(|r| r.recall).sum::<f64>() / reports.len() as f64
        };

        info!(failures, mean_recall, "evaluation complete");
        EvaluationSummary {
            reports,
            mean_recall,
            failures,
        }
    }

    async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        let session_id = format!("eval_{}", uuid::Uuid::new_v4().simple());
        let mut session = SessionManager::new(session_id, Arc::new(InMemoryContextStore::new()));

        let mut report = ScenarioReport {
            scenario_type: scenario.scenario_type.clone(),
            query: scenario.query.clone(),
            response: None,
            subtasks_count: 0,
            agents_used: Vec::new(),
            delegation_count: 0,
            recall: 0.0,
            error: None,
        };

        match session.process_inquiry(&self.orchestrator, &scenario.query).await {
            Ok(outcome) => {
                report.agents_used = outcome.agents_used();
                report.recall = expected_agent_recall(&scenario.expected_agents, &report.agents_used);
                report.subtasks_count = outcome.decomposition.subtasks.len();
                report.delegation_count = outcome.delegation_history.len();
                report.response = Some(outcome.response);
            }
            Err(e) => {
                warn!("Scenario {} failed: {}", scenario.scenario_type, e);
                report.error = Some(e.to_string());
            }
        }
        report
    }
}
