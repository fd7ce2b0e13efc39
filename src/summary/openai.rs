use crate::error::{Result, ScoutError};
use crate::summary::{SummaryRequest, Summarizer};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Summarizer backed by an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAiSummarizer {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from `OPENAI_API_KEY` (and optionally `OPENAI_MODEL`, `OPENAI_BASE_URL`)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ScoutError::SummaryFailed("OPENAI_API_KEY not set".into()))?;
        let mut summarizer = Self::new(api_key);
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            summarizer = summarizer.with_model(model);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            summarizer = summarizer.with_base_url(url);
        }
        Ok(summarizer)
    }

    /// Builder method: custom base URL (Azure, proxies, local servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method: model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method: per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::SummaryFailed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: SummaryRequest) -> Result<String> {
        let prompt = request.prompt();
        let body = ChatRequest { model: &self.model, messages: vec![ChatMessage { role: "user", content: &prompt }] };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::warn!("Summary request failed: {}", e);
                ScoutError::SummaryFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::warn!("Summary API returned {}: {}", status, error_text);
            return Err(ScoutError::SummaryFailed(format!("API error {}: {}", status, error_text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::SummaryFailed(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ScoutError::SummaryFailed("Empty completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let summarizer = OpenAiSummarizer::new("sk-test").with_base_url("http://localhost:8080/v1/").with_model("local");

        assert_eq!(summarizer.base_url(), "http://localhost:8080/v1");
        assert_eq!(summarizer.model(), "local");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" Mugs from $5 to $20. "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(" Mugs from $5 to $20. "));
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatRequest { model: "m", messages: vec![ChatMessage { role: "user", content: "hi" }] };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["model"], "m");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_summary_error() {
        let summarizer = OpenAiSummarizer::new("sk-test")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .unwrap();

        let result = summarizer.summarize(SummaryRequest::new("https://shop.test", &[])).await;
        assert!(matches!(result, Err(ScoutError::SummaryFailed(_))));
    }
}
