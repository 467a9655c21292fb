//! Summarization backends and the factory that builds them.
//!
//! Each adapter is a thin `reqwest` client for one wire format:
//! OpenAI chat completions (also used for OpenAI-compatible servers),
//! Anthropic messages, and Gemini `generateContent`.

pub mod anthropic;
pub mod factory;
pub mod gemini;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use traits::{AdapterConfig, SummaryProvider};

use reqwest::Response;

use crate::{Result, TldwError};

/// Pass a successful response through; turn anything else into an error
/// carrying the response body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TldwError::from_status(status, body))
}

/// Strip a trailing slash so paths can be appended with `format!`.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
