//! Adapter trait implemented by every summarization backend.
//!
//! Adapters are built per request by the
//! [`ProviderFactory`](super::ProviderFactory) from the selected model and
//! the generation profile. They hold everything they need to make a call, so
//! the registry is not consulted again once an adapter exists.
//!
//! # Error Semantics
//!
//! - [`test_connection`](SummaryProvider::test_connection) never fails; any
//!   error is logged and reported as `false`.
//! - [`summarize_video`](SummaryProvider::summarize_video) surfaces
//!   `AuthenticationFailed` for 401/403, `Api` for other non-success
//!   statuses, and `EmptyResponse` when the model returns no text.

use async_trait::async_trait;

use crate::Result;
use crate::registry::ProviderType;

/// Parameters forwarded from the registry into an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    pub api_key: String,
    /// Model name sent to the backend.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Endpoint override (OpenAI-compatible backends only).
    pub base_url: Option<String>,
}

/// A backend that can summarize a video.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Backend family this adapter talks to.
    fn provider_type(&self) -> ProviderType;

    /// Parameters this adapter was built with.
    fn config(&self) -> &AdapterConfig;

    /// Check that the endpoint is reachable and accepts the key.
    async fn test_connection(&self) -> bool;

    /// Produce a summary for `video_url` following `prompt`.
    ///
    /// `prompt` already contains the transcript; backends that can watch the
    /// video directly may also use `video_url`.
    async fn summarize_video(&self, video_url: &str, prompt: &str) -> Result<String>;
}
