//! Anthropic messages API client.
//!
//! See: <https://docs.anthropic.com/en/api/messages>

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::traits::{AdapterConfig, SummaryProvider};
use super::{check_status, normalize_base_url};
use crate::registry::ProviderType;
use crate::{Result, TldwError};

/// Default base URL for the Anthropic API
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value
const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API.
#[derive(Clone)]
pub struct AnthropicProvider {
    config: AdapterConfig,
    http: Client,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(config: AdapterConfig, http: Client) -> Self {
        Self {
            config,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (for testing with wiremock).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
    }
}

#[async_trait]
impl SummaryProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Anthropic
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    #[instrument(name = "anthropic.test_connection", skip(self))]
    async fn test_connection(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        let result = match self.request(self.http.get(url)).send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(TldwError::from(e)),
        };
        if let Err(e) = &result {
            warn!(error = %e, "connection test failed");
        }
        result.is_ok()
    }

    #[instrument(name = "anthropic.summarize", skip(self, prompt), fields(model = %self.config.model))]
    async fn summarize_video(&self, _video_url: &str, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        let response = self.request(self.http.post(url)).json(&body).send().await?;
        let response: MessagesResponse = check_status(response).await?.json().await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(TldwError::EmptyResponse);
        }
        Ok(text)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
