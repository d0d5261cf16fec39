//! Simulated data sources
//!
//! Each tool returns a fixed report that echoes its input. They stand in
//! for the databases and document stores a deployment would connect.

use async_trait::async_trait;
use crewline_core::tool::{string_input, SchemaBuilder};
use crewline_core::{Result, Tool, ToolResult};
use serde_json::Value;

/// A canned report tool
pub struct ReportTool {
    name: &'static str,
    description: &'static str,
    field: &'static str,
    render: fn(&str) -> String,
}

impl ReportTool {
    pub fn database_query() -> Self {
        Self {
            name: "database_query",
            description: "Query structured databases for data analysis.",
            field: "query",
            render: |q| {
                format!(
                    "Database results for query: {}\n[Simulated data: Customer segments, transaction patterns, risk scores]",
                    q
                )
            },
        }
    }

    pub fn document_retriever() -> Self {
        Self {
            name: "document_retriever",
            description: "Retrieve and analyze documents from knowledge base.",
            field: "query",
            render: |q| {
                format!(
                    "Retrieved documents for: {}\n[Doc1: Policy guidelines]\n[Doc2: Best practices]\n[Doc3: Case studies]",
                    q
                )
            },
        }
    }

    pub fn financial_analysis() -> Self {
        Self {
            name: "financial_analysis",
            description: "Perform financial calculations and risk assessments.",
            field: "params",
            render: |p| {
                format!(
                    "Financial analysis: {}\nRisk Score: 0.3\nROI Projection: 12.5%\nMarket Volatility: Medium",
                    p
                )
            },
        }
    }

    pub fn client_portfolio_query() -> Self {
        Self {
            name: "client_portfolio_query",
            description: "Query client portfolio holdings, transactions, account details, and investment history.",
            field: "query",
            render: |q| {
                format!(
                    r#"Client Portfolio Query: {}

Portfolio Holdings:
- US Large Cap Equities: $450,000 (45%)
- International Developed: $150,000 (15%)
- Fixed Income - Investment Grade: $200,000 (20%)
- Fixed Income - High Yield: $50,000 (5%)
- Alternative Investments: $100,000 (10%)
- Cash & Equivalents: $50,000 (5%)

Total AUM: $1,000,000
Risk Profile: Moderate Growth
Investment Horizon: 10+ years
Last Rebalance: 6 months ago"#,
                    q
                )
            },
        }
    }

    pub fn policy_document_retriever() -> Self {
        Self {
            name: "policy_document_retriever",
            description: "Retrieve investment policy documents, compliance guidelines, and regulatory requirements.",
            field: "query",
            render: |q| {
                format!(
                    r#"Policy Documents Retrieved for: {}

[Doc1: Investment Policy Statement Guidelines]
- Outlines client suitability requirements
- Risk tolerance assessment criteria
- Rebalancing triggers and thresholds

[Doc2: Regulatory Compliance - Fiduciary Standards]
- SEC Regulation Best Interest requirements
- Suitability documentation standards
- Disclosure obligations

[Doc3: Product Due Diligence Framework]
- Approved product list criteria
- Alternative investment guidelines
- Concentration limits by asset class"#,
                    q
                )
            },
        }
    }

    pub fn portfolio_analytics() -> Self {
        Self {
            name: "portfolio_analytics",
            description: "Perform portfolio analytics including risk metrics, performance attribution, and optimization analysis.",
            field: "params",
            render: |p| {
                format!(
                    r#"Portfolio Analytics Report: {}

Risk Metrics:
- Portfolio Beta: 0.92
- Standard Deviation: 12.4%
- Sharpe Ratio: 0.85
- Max Drawdown (3yr): -18.2%
- Value at Risk (95%): -2.1% daily

Performance Attribution (YTD):
- Asset Allocation Effect: +1.2%
- Security Selection Effect: +0.8%
- Interaction Effect: +0.1%
- Total Active Return: +2.1%

Style Analysis:
- Growth Tilt: Moderate
- Quality Factor: High
- Momentum Exposure: Low"#,
                    p
                )
            },
        }
    }
}

#[async_trait]
impl Tool for ReportTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::single_string(self.field, "What the report should cover")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        Ok(match string_input(&input, self.field) {
            Some(text) => ToolResult::success((self.render)(text)),
            None => ToolResult::error(format!("Missing `{}`", self.field)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reports_echo_input() {
        let tool = ReportTool::database_query();
        let result = tool.execute(json!({"query": "churn by segment"})).await.unwrap();
        assert_eq!(
            result.output,
            "Database results for query: churn by segment\n[Simulated data: Customer segments, transaction patterns, risk scores]"
        );

        let result = ReportTool::client_portfolio_query()
            .execute(json!("Smith family"))
            .await
            .unwrap();
        assert!(result.output.starts_with("Client Portfolio Query: Smith family\n\nPortfolio Holdings:"));
        assert!(result.output.contains("Total AUM: $1,000,000"));

        let result = ReportTool::portfolio_analytics()
            .execute(json!({"params": "growth sleeve"}))
            .await
            .unwrap();
        assert!(result.output.contains("Sharpe Ratio: 0.85"));
    }

    #[tokio::test]
    async fn test_missing_field_is_error_result() {
        let tool = ReportTool::financial_analysis();
        let result = tool.execute(json!({"query": "wrong field"})).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.output, "Missing `params`");
        assert_eq!(tool.input_schema()["required"], json!(["params"]));
    }
}
