//! Google Gemini `generateContent` client.
//!
//! Gemini can read public YouTube videos directly, so the video URL is
//! attached as a `file_data` part ahead of the prompt. See:
//! <https://ai.google.dev/gemini-api/docs/video-understanding>

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::traits::{AdapterConfig, SummaryProvider};
use super::{check_status, normalize_base_url};
use crate::registry::ProviderType;
use crate::{Result, TldwError};

/// Default base URL for the Gemini API
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini API.
#[derive(Clone)]
pub struct GeminiProvider {
    config: AdapterConfig,
    http: Client,
    base_url: String,
}

impl GeminiProvider {
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
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Gemini
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    #[instrument(name = "gemini.test_connection", skip(self))]
    async fn test_connection(&self) -> bool {
        let url = format!("{}/v1beta/models", self.base_url);
        let request = self
            .http
            .get(url)
            .header("x-goog-api-key", &self.config.api_key);
        let result = match request.send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(TldwError::from(e)),
        };
        if let Err(e) = &result {
            warn!(error = %e, "connection test failed");
        }
        result.is_ok()
    }

    #[instrument(name = "gemini.summarize", skip(self, prompt), fields(model = %self.config.model))]
    async fn summarize_video(&self, video_url: &str, prompt: &str) -> Result<String> {
        let mut parts = Vec::with_capacity(2);
        if !video_url.is_empty() {
            parts.push(Part::File {
                file_data: FileData {
                    file_uri: video_url,
                },
            });
        }
        parts.push(Part::Text { text: prompt });

        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.config.model
        );
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response: GenerateResponse = check_status(response).await?.json().await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    File { file_data: FileData<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct FileData<'a> {
    file_uri: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
