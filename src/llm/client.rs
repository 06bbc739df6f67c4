use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::config::{Config, ConfigError, DEFAULT_ANTHROPIC_BASE_URL, RetryPolicy};
use crate::fetcher::get_client;
use crate::jobs::retry;
use crate::llm::LlmError;
use crate::llm::types::{ChatRequest, ChatResponse, WireMessage};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A hosted model that answers a single prompt with text.
#[async_trait]
pub trait CompletionModel: Send + Sync + 'static {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct ClaudeClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: get_client().clone(),
            api_key: api_key.into(),
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.require_anthropic_api_key()?, config.clean_model())
            .with_base_url(config.anthropic_base_url())
            .with_retry(config.retry()))
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| LlmError::InvalidApiKey(e.to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/messages", self.base_url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::api(status, error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LlmError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CompletionModel for ClaudeClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest::new(&self.model).message(WireMessage::user(prompt));

        let response = retry(
            self.retry,
            "model request",
            || self.chat(&request),
            LlmError::should_retry,
        )
        .await?;

        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = ?response.stop_reason,
                "Model responded"
            );
        }

        response
            .first_text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}
