//! crewline-tools: Built-in tools for crewline specialists
//!
//! Search goes to SerpAPI; the data-source tools return simulated reports;
//! the calculators evaluate plain arithmetic only.

use crewline_core::agents::RosterKind;
use crewline_core::config::ToolsConfig;
use crewline_core::ToolManager;

pub mod calculator;
pub mod reports;
pub mod search;

pub use calculator::{CodeExecutorTool, FinancialCalculatorTool};
pub use reports::ReportTool;
pub use search::{SearchKind, SerpApiSearchTool};

use std::sync::Arc;

/// Register the tools the general roster binds to
pub fn register_general_tools(manager: &mut ToolManager, config: &ToolsConfig) {
    manager.register(Arc::new(SerpApiSearchTool::web(config.serpapi_key.clone())));
    manager.register(Arc::new(ReportTool::database_query()));
    manager.register(Arc::new(CodeExecutorTool));
    manager.register(Arc::new(ReportTool::document_retriever()));
    manager.register(Arc::new(ReportTool::financial_analysis()));
}

/// Register the tools the wealth advisory roster binds to
pub fn register_wealth_tools(manager: &mut ToolManager, config: &ToolsConfig) {
    manager.register(Arc::new(SerpApiSearchTool::market(config.serpapi_key.clone())));
    manager.register(Arc::new(ReportTool::client_portfolio_query()));
    manager.register(Arc::new(FinancialCalculatorTool));
    manager.register(Arc::new(ReportTool::policy_document_retriever()));
    manager.register(Arc::new(ReportTool::portfolio_analytics()));
}

/// Register every tool `roster` refers to
pub fn register_default_tools(manager: &mut ToolManager, roster: RosterKind, config: &ToolsConfig) {
    match roster {
        RosterKind::General => register_general_tools(manager, config),
        RosterKind::WealthAdvisory => register_wealth_tools(manager, config),
    }
}
