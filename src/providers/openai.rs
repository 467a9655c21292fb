//! OpenAI chat completions client.
//!
//! Also serves OpenAI-compatible servers (Ollama, LM Studio, vLLM, ...) when
//! the provider carries a custom `url`. See:
//! <https://platform.openai.com/docs/api-reference/chat>

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::traits::{AdapterConfig, SummaryProvider};
use super::{check_status, normalize_base_url};
use crate::registry::ProviderType;
use crate::{Result, TldwError};

/// Default base URL for the OpenAI API
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-style chat completion endpoints.
#[derive(Clone)]
pub struct OpenAiProvider {
    config: AdapterConfig,
    http: Client,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a client; `config.base_url` overrides the OpenAI endpoint.
    pub fn new(config: AdapterConfig, http: Client) -> Self {
        let base_url = normalize_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));
        Self {
            config,
            http,
            base_url,
        }
    }

    /// Endpoint requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // Local OpenAI-compatible servers often run keyless.
        if self.config.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.config.api_key)
        }
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAi
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    #[instrument(name = "openai.test_connection", skip(self), fields(base_url = %self.base_url))]
    async fn test_connection(&self) -> bool {
        let request = self.authorized(self.http.get(format!("{}/models", self.base_url)));
        let result = match request.send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(TldwError::from(e)),
        };
        if let Err(e) = &result {
            warn!(error = %e, "connection test failed");
        }
        result.is_ok()
    }

    #[instrument(name = "openai.summarize", skip(self, prompt), fields(model = %self.config.model))]
    async fn summarize_video(&self, _video_url: &str, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .authorized(self.http.post(format!("{}/chat/completions", self.base_url)))
            .json(&body)
            .send()
            .await?;
        let response: ChatResponse = check_status(response).await?.json().await?;

        response
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(TldwError::EmptyResponse)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: Option<&str>) -> AdapterConfig {
        AdapterConfig {
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 100,
            temperature: 0.2,
            base_url: base_url.map(String::from),
        }
    }

    #[test]
    fn default_base_url() {
        let provider = OpenAiProvider::new(config(None), Client::new());
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn custom_base_url_trailing_slash_trimmed() {
        let provider = OpenAiProvider::new(config(Some("http://localhost:11434/v1/")), Client::new());
        assert_eq!(provider.base_url(), "http://localhost:11434/v1");
    }

    #[test]
    fn request_serializes_profile() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 42,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 42);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
