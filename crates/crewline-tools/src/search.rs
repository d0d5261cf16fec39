//! Web search via SerpAPI: `search_web` and `market_data_search`

use async_trait::async_trait;
use crewline_core::tool::{string_input, SchemaBuilder};
use crewline_core::{Result, Tool, ToolResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const MAX_RESULTS: usize = 6;

/// Which search a [`SerpApiSearchTool`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Plain Google search
    Web,
    /// Google search biased toward financial market coverage
    Market,
}

impl SearchKind {
    fn tool_name(self) -> &'static str {
        match self {
            SearchKind::Web => "search_web",
            SearchKind::Market => "market_data_search",
        }
    }

    fn description(self) -> &'static str {
        match self {
            SearchKind::Web => "Search the web for up-to-date information using SerpAPI.",
            SearchKind::Market => {
                "Search for market data, research reports, economic indicators, and financial news."
            }
        }
    }

    fn upstream_query(self, query: &str) -> String {
        match self {
            SearchKind::Web => query.to_string(),
            SearchKind::Market => format!("{} financial markets investment", query),
        }
    }

    fn heading(self) -> &'static str {
        match self {
            SearchKind::Web => "Search results",
            SearchKind::Market => "Market research results",
        }
    }

    fn error_prefix(self) -> &'static str {
        match self {
            SearchKind::Web => "SerpAPI error",
            SearchKind::Market => "Market data search error",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

pub struct SerpApiSearchTool {
    client: Client,
    api_key: Option<String>,
    kind: SearchKind,
    base_url: String,
}

impl SerpApiSearchTool {
    pub fn new(kind: SearchKind, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            kind,
            base_url: SERPAPI_URL.to_string(),
        }
    }

    pub fn web(api_key: Option<String>) -> Self {
        Self::new(SearchKind::Web, api_key)
    }

    pub fn market(api_key: Option<String>) -> Self {
        Self::new(SearchKind::Market, api_key)
    }

    /// Point at a different endpoint (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    async fn search(&self, query: &str) -> std::result::Result<SerpApiResponse, String> {
        let api_key = self.api_key.as_deref().ok_or("SERPAPI_KEY not configured")?;
        let num = MAX_RESULTS.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", self.kind.upstream_query(query).as_str()),
                ("api_key", api_key),
                ("engine", "google"),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(redact)?
            .error_for_status()
            .map_err(redact)?;

        response.json().await.map_err(redact)
    }
}

/// The request URL carries the API key, so it never reaches the error text
fn redact(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

/// `• title – snippet` then the indented link, one entry per result
fn format_results(kind: SearchKind, query: &str, response: &SerpApiResponse) -> String {
    let entries: Vec<String> = response
        .organic_results
        .iter()
        .take(MAX_RESULTS)
        .map(|r| {
            format!(
                "• {} – {}\n  {}",
                r.title.as_deref().unwrap_or("No title"),
                r.snippet,
                r.link
            )
        })
        .collect();

    let body = if entries.is_empty() {
        "No results found.".to_string()
    } else {
        entries.join("\n")
    };
    format!("{} for '{}':\n{}", kind.heading(), query, body)
}

#[async_trait]
impl Tool for SerpApiSearchTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::single_string("query", "The search query")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let Some(query) = string_input(&input, "query") else {
            return Ok(ToolResult::error("Query cannot be empty"));
        };

        tracing::info!(tool = self.name(), query = %query, "Executing search");

        Ok(match self.search(query).await {
            Ok(response) => ToolResult::success(format_results(self.kind, query, &response)),
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                ToolResult::error(format!("{}: {}", self.kind.error_prefix(), err))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> SerpApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_results() {
        let parsed = response(json!({
            "organic_results": [
                {"title": "RBA holds rates", "snippet": "The cash rate stays.", "link": "https://example.com/a"},
                {"snippet": "Untitled entry", "link": "https://example.com/b"}
            ]
        }));

        let output = format_results(SearchKind::Web, "rates", &parsed);
        assert_eq!(
            output,
            "Search results for 'rates':\n\
             • RBA holds rates – The cash rate stays.\n  https://example.com/a\n\
             • No title – Untitled entry\n  https://example.com/b"
        );
    }

    #[test]
    fn test_format_caps_and_empty() {
        let many: Vec<Value> = (0..10)
            .map(|i| json!({"title": format!("t{}", i), "snippet": "", "link": ""}))
            .collect();
        let output = format_results(SearchKind::Market, "bonds", &response(json!({ "organic_results": many })));
        assert!(output.starts_with("Market research results for 'bonds':"));
        assert_eq!(output.matches('•').count(), 6);

        let output = format_results(SearchKind::Web, "x", &response(json!({})));
        assert_eq!(output, "Search results for 'x':\nNo results found.");
    }

    #[test]
    fn test_market_query_suffix() {
        assert_eq!(
            SearchKind::Market.upstream_query("Fed rates"),
            "Fed rates financial markets investment"
        );
        assert_eq!(SearchKind::Web.upstream_query("Fed rates"), "Fed rates");
    }

    #[tokio::test]
    async fn test_missing_key_is_error_result() {
        let tool = SerpApiSearchTool::market(Some("  ".into()));
        let result = tool.execute(json!({"query": "bonds"})).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.output, "Market data search error: SERPAPI_KEY not configured");

        let tool = SerpApiSearchTool::web(None);
        assert_eq!(tool.name(), "search_web");
        let result = tool.execute(json!("")).await.unwrap();
        assert_eq!(result, ToolResult::error("Query cannot be empty"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error_result() {
        let tool = SerpApiSearchTool::web(Some("SECRET-KEY-123".into()))
            .with_base_url("http://127.0.0.1:9/search.json");
        let result = tool.execute(json!({"query": "rust"})).await.unwrap();
        assert!(result.is_error);
        assert!(result.output.starts_with("SerpAPI error: "));
        assert!(!result.output.contains("SECRET-KEY-123"));
        assert!(!result.output.contains("api_key"));
    }
}
