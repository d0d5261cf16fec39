//! LLM API HTTP Client
//!
//! Supports both the Anthropic Messages API and OpenAI-compatible APIs.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Error, Result};

use super::traits::LlmClient;
use super::types::*;

/// HTTP-backed LLM client
#[derive(Clone)]
pub struct HttpLlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
    max_tokens: u64,
}

impl HttpLlmClient {
    /// Create a new LLM client
    pub fn new(config: &LlmConfig, max_tokens: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => default_base_url(&config.provider).to_string(),
        };

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
            provider: config.provider.clone(),
            max_tokens,
        })
    }

    /// Send a message to the LLM API
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        match self.provider {
            LlmProvider::Claude => self.send_claude_request(request).await,
            LlmProvider::OpenAi => self.send_openai_request(request).await,
        }
    }

    async fn send_claude_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/messages", self.base_url);

        debug!("Sending request to Messages API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Messages API error: {} - {}", status, body);
            return Err(Error::Llm(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Llm(format!("Failed to parse response: {} - {}", e, body))
        })?;

        info!(
            "Messages API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    async fn send_openai_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let openai_request = ChatCompletionRequest::from_messages_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::Llm(format!("{}: {}", status, body)));
        }

        let openai_response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Llm(format!("Failed to parse response: {} - {}", e, body))
        })?;

        let parsed = openai_response.into_messages_response();

        info!(
            "OpenAI API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Create a messages request builder
    pub fn request_builder(&self) -> MessagesRequestBuilder {
        MessagesRequestBuilder::new(self.model.clone()).max_tokens(self.max_tokens)
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn default_base_url(provider: &LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Claude => "https://api.anthropic.com/v1",
        LlmProvider::OpenAi => "https://api.openai.com/v1",
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String> {
        let request = self
            .request_builder()
            .system(system)
            .messages(messages.iter().cloned())
            .build();

        let response = self.messages(request).await?;
        Ok(response.text())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProvider, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: "key".to_string(),
            model: "test-model".to_string(),
            provider,
            base_url: base_url.map(String::from),
        }
    }

    #[test]
    fn test_default_base_urls() {
        let claude = HttpLlmClient::new(&config(LlmProvider::Claude, None), 1024).unwrap();
        assert_eq!(claude.base_url(), "https://api.anthropic.com/v1");

        let openai = HttpLlmClient::new(&config(LlmProvider::OpenAi, None), 1024).unwrap();
        assert_eq!(openai.base_url(), "https://api.openai.com/v1");
        assert_eq!(openai.model(), "test-model");
    }

    #[test]
    fn test_custom_base_url_trims_slash() {
        let client = HttpLlmClient::new(
            &config(LlmProvider::OpenAi, Some("http://localhost:8080/v1/")),
            1024,
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_request_builder_uses_budget() {
        let client = HttpLlmClient::new(&config(LlmProvider::Claude, None), 512).unwrap();
        let request = client.request_builder().user("hi").build();
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.model, "test-model");
    }
}
