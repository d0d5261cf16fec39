//! Built-in specialist rosters
//!
//! A roster is the static capability registry for one deployment: the
//! specialists, their proficiencies and bound tools, plus the task tags and
//! tool names the analyzer is told about.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{SpecialistProfile, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RosterKind {
    /// Research, data, finance, engineering, writing and legal specialists
    #[default]
    General,
    /// Wealth-management advisory team
    WealthAdvisory,
}

impl RosterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::WealthAdvisory => "wealth_advisory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "general" => Some(Self::General),
            "wealth_advisory" | "wealth" => Some(Self::WealthAdvisory),
            _ => None,
        }
    }

    /// Specialists in registration order
    pub fn profiles(&self) -> Vec<SpecialistProfile> {
        match self {
            Self::General => general_profiles(),
            Self::WealthAdvisory => wealth_profiles(),
        }
    }

    /// Task tags offered to the analyzer
    pub fn task_types(&self) -> &'static [TaskType] {
        match self {
            Self::General => &[
                TaskType::Research,
                TaskType::Analysis,
                TaskType::Creative,
                TaskType::Technical,
                TaskType::Financial,
                TaskType::Legal,
                TaskType::General,
            ],
            Self::WealthAdvisory => &[
                TaskType::PortfolioAnalysis,
                TaskType::MarketResearch,
                TaskType::InvestmentStrategy,
                TaskType::ComplianceCheck,
                TaskType::ClientCommunication,
                TaskType::Technical,
                TaskType::General,
            ],
        }
    }

    /// Tool names offered to the analyzer
    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            Self::General => &[
                "search_web",
                "database_query",
                "code_executor",
                "document_retriever",
                "financial_analysis",
            ],
            Self::WealthAdvisory => &[
                "market_data_search",
                "client_portfolio_query",
                "portfolio_analytics",
                "financial_calculator",
                "policy_document_retriever",
            ],
        }
    }

    /// Tool required by the single-subtask fallback decomposition
    pub fn fallback_tool(&self) -> &'static str {
        match self {
            Self::General => "search_web",
            Self::WealthAdvisory => "market_data_search",
        }
    }

    /// Capability required by the single-subtask fallback decomposition
    pub fn fallback_capability(&self) -> &'static str {
        match self {
            Self::General => "web_research",
            Self::WealthAdvisory => "market_research",
        }
    }
}

impl fmt::Display for RosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn general(name: &str, role: &str) -> SpecialistProfile {
    SpecialistProfile::new(name, role)
        .backstory(format!("Expert {} with deep knowledge and proven track record.", role))
}

fn wealth(name: &str, role: &str) -> SpecialistProfile {
    SpecialistProfile::new(name, role).backstory(format!(
        "Senior {} with extensive experience in wealth management and client advisory services.",
        role
    ))
}

fn with_general_goal(profile: SpecialistProfile) -> SpecialistProfile {
    let goal = format!(
        "Complete tasks that require {}",
        profile.capability_names().join(", ")
    );
    profile.goal(goal)
}

fn with_wealth_goal(profile: SpecialistProfile) -> SpecialistProfile {
    let goal = format!(
        "Provide expert wealth advisory support for {}",
        profile.capability_names().join(", ")
    );
    profile.goal(goal)
}

fn general_profiles() -> Vec<SpecialistProfile> {
    vec![
        general("research_specialist", "Senior Research Analyst")
            .capability("web_research", "Expert at finding and synthesizing web information", 0.95)
            .capability("fact_checking", "Validates information accuracy", 0.9)
            .capability("source_evaluation", "Assesses source credibility", 0.85)
            .capability("trend_analysis", "Identifies patterns and trends", 0.8)
            .tools(["search_web", "document_retriever"]),
        general("data_analyst", "Senior Data Analyst")
            .capability("statistical_analysis", "Advanced statistical methods", 0.9)
            .capability("data_visualization", "Creates insightful visualizations", 0.85)
            .capability("predictive_modeling", "Builds predictive models", 0.8)
            .capability("database_operations", "Expert at data querying", 0.95)
            .tools(["database_query", "code_executor"]),
        general("financial_advisor", "Senior Financial Advisor")
            .capability("investment_analysis", "Portfolio and investment expertise", 0.9)
            .capability("risk_assessment", "Evaluates financial risks", 0.95)
            .capability("tax_planning", "Tax optimization strategies", 0.8)
            .capability("market_analysis", "Market trends and forecasting", 0.85)
            .tools(["financial_analysis", "search_web", "code_executor"]),
        general("technical_expert", "Senior Technical Architect")
            .capability("system_design", "Designs complex systems", 0.9)
            .capability("code_review", "Reviews and improves code", 0.85)
            .capability("debugging", "Identifies and fixes issues", 0.9)
            .capability("performance_optimization", "Optimizes system performance", 0.8)
            .tools(["code_executor", "document_retriever"]),
        general("creative_writer", "Senior Content Strategist")
            .capability("content_creation", "Creates engaging content", 0.95)
            .capability("storytelling", "Crafts compelling narratives", 0.9)
            .capability("editing", "Refines and polishes content", 0.85)
            .capability("audience_analysis", "Understands target audiences", 0.8)
            .tools(["search_web", "document_retriever"]),
        general("legal_advisor", "Senior Legal Counsel")
            .capability("contract_review", "Analyzes legal documents", 0.9)
            .capability("compliance_check", "Ensures regulatory compliance", 0.95)
            .capability("risk_mitigation", "Identifies legal risks", 0.85)
            .capability("legal_research", "Researches case law and regulations", 0.9)
            .tools(["document_retriever", "search_web"]),
    ]
    .into_iter()
    .map(with_general_goal)
    .collect()
}

fn wealth_profiles() -> Vec<SpecialistProfile> {
    vec![
        wealth("market_intelligence_analyst", "Senior Market Intelligence Analyst")
            .capability("market_research", "Expert at analyzing market trends and investment opportunities", 0.95)
            .capability("economic_analysis", "Interprets macroeconomic indicators and their portfolio impact", 0.9)
            .capability("sector_analysis", "Deep expertise in sector rotation and industry dynamics", 0.85)
            .capability("competitor_intelligence", "Monitors competitor offerings and market positioning", 0.8)
            .tools(["market_data_search", "policy_document_retriever"]),
        wealth("quantitative_analyst", "Senior Quantitative Analyst")
            .capability("portfolio_optimization", "Expert in modern portfolio theory and optimization", 0.95)
            .capability("risk_modeling", "Advanced risk metrics and VaR calculations", 0.9)
            .capability("performance_attribution", "Decomposes portfolio returns by factor and allocation", 0.9)
            .capability("stress_testing", "Scenario analysis and stress testing methodologies", 0.85)
            .tools(["client_portfolio_query", "portfolio_analytics", "financial_calculator"]),
        wealth("wealth_strategist", "Senior Wealth Strategist")
            .capability("asset_allocation", "Strategic and tactical asset allocation expertise", 0.95)
            .capability("retirement_planning", "Comprehensive retirement income planning", 0.9)
            .capability("tax_optimization", "Tax-efficient investment strategies", 0.85)
            .capability("estate_planning", "Wealth transfer and legacy planning considerations", 0.8)
            .tools(["portfolio_analytics", "market_data_search", "financial_calculator"]),
        wealth("fintech_solutions_architect", "Senior FinTech Solutions Architect")
            .capability("digital_onboarding", "Digital client onboarding and KYC automation", 0.9)
            .capability("api_integration", "Wealth platform API integrations and data flows", 0.9)
            .capability("platform_capabilities", "Advisory platform features and capabilities", 0.85)
            .capability("automation_design", "Workflow automation and operational efficiency", 0.85)
            .tools(["financial_calculator", "policy_document_retriever"]),
        wealth("client_communications_specialist", "Senior Client Communications Specialist")
            .capability("proposal_writing", "Creates compelling investment proposals", 0.95)
            .capability("client_reporting", "Quarterly reviews and performance reports", 0.9)
            .capability("personalized_content", "Tailored client communications and updates", 0.9)
            .capability("presentation_design", "Client meeting materials and presentations", 0.85)
            .tools(["market_data_search", "policy_document_retriever"]),
        wealth("regulatory_compliance_officer", "Senior Regulatory Compliance Officer")
            .capability("suitability_review", "Investment suitability and best interest standards", 0.95)
            .capability("kyc_verification", "Know Your Customer and AML compliance", 0.9)
            .capability("regulatory_research", "SEC, FINRA, and state regulatory requirements", 0.9)
            .capability("fiduciary_compliance", "Fiduciary duty and disclosure obligations", 0.85)
            .tools(["policy_document_retriever", "market_data_search"]),
    ]
    .into_iter()
    .map(with_wealth_goal)
    .collect()
}
