//! Summarization pipeline: video id → transcript → selected model → summary.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::providers::ProviderFactory;
use crate::registry::{GenerationProfile, ModelView, SettingsRegistry};
use crate::telemetry;
use crate::transcript::{Transcript, TranscriptSource};
use crate::video::VideoId;
use crate::{Result, TldwError};

/// A finished summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub video: VideoId,
    pub transcript: Transcript,
    /// Model that produced the summary.
    pub model: ModelView,
    /// Markdown returned by the model.
    pub content: String,
}

/// Runs the summarization pipeline against a registry's current selection.
pub struct Summarizer {
    transcripts: Arc<dyn TranscriptSource>,
    factory: ProviderFactory,
}

impl Summarizer {
    pub fn new(transcripts: Arc<dyn TranscriptSource>, factory: ProviderFactory) -> Self {
        Self {
            transcripts,
            factory,
        }
    }

    /// Summarize the video at `input` (URL or bare id) with the selected model.
    #[instrument(skip(self, registry))]
    pub async fn summarize(&self, registry: &SettingsRegistry, input: &str) -> Result<Summary> {
        let video = VideoId::parse(input)?;
        let model = registry.selected_model().ok_or(TldwError::NoModelSelected)?;
        let profile = registry.generation_profile();
        let adapter = self.factory.create(&model, &profile)?;

        let transcript = self.transcripts.fetch(&video).await?;
        if transcript.is_empty() {
            return Err(TldwError::Validation(format!(
                "video {video} has no transcript"
            )));
        }
        let prompt = render_prompt(&profile, &video, &transcript);

        info!(video = %video, model = %model.name, provider = %model.provider.name, "summarizing");
        let start = Instant::now();
        let result = adapter.summarize_video(&video.watch_url(), &prompt).await;
        record_request(adapter.name(), "summarize", start, result.is_ok());

        Ok(Summary {
            video,
            transcript,
            model,
            content: result?,
        })
    }
}

/// Test a provider's credentials and store the outcome in the registry.
///
/// Uses the provider's first model as the probe model (an empty name when
/// the provider has none). Returns whether the test passed.
pub async fn verify_provider(
    registry: &mut SettingsRegistry,
    factory: &ProviderFactory,
    provider_name: &str,
) -> Result<bool> {
    let provider = registry
        .provider(provider_name)
        .ok_or_else(|| TldwError::NotFound(format!("provider '{provider_name}' not found")))?;
    let probe = provider.models.first().cloned().unwrap_or_default();
    let view = ModelView::new(provider, &probe);

    let adapter = factory.create(&view, &registry.generation_profile())?;
    let start = Instant::now();
    let ok = adapter.test_connection().await;
    record_request(adapter.name(), "test_connection", start, ok);

    info!(provider = provider_name, verified = ok, "connection test finished");
    registry.set_provider_verified(provider_name, ok).await?;
    Ok(ok)
}

/// Build the prompt sent to the model: custom instructions, then video
/// details, then the transcript.
pub fn render_prompt(
    profile: &GenerationProfile,
    video: &VideoId,
    transcript: &Transcript,
) -> String {
    let meta = &transcript.metadata;
    let mut prompt = String::new();
    prompt.push_str(profile.custom_prompt.trim());
    prompt.push_str("\n\n");
    if !meta.title.is_empty() {
        prompt.push_str(&format!("Title: {}\n", meta.title));
    }
    if !meta.author.is_empty() {
        prompt.push_str(&format!("Channel: {}\n", meta.author));
    }
    prompt.push_str(&format!("URL: {}\n\n", video.watch_url()));
    prompt.push_str("Transcript:\n");
    prompt.push_str(&transcript.text());
    prompt
}

fn record_request(provider: &str, operation: &'static str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "provider" => provider.to_owned(),
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "provider" => provider.to_owned(),
        "operation" => operation,
    )
    .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{TranscriptLine, VideoMetadata};

    #[test]
    fn prompt_layout() {
        let profile = GenerationProfile {
            custom_prompt: "Summarize.\n".into(),
            max_tokens: 1,
            temperature: 0.0,
        };
        let video = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let transcript = Transcript {
            metadata: VideoMetadata {
                title: "A Song".into(),
                author: "Rick".into(),
                channel_url: None,
            },
            lines: vec![TranscriptLine {
                text: "never gonna".into(),
                offset_ms: 0,
                duration_ms: 1,
            }],
        };

        let prompt = render_prompt(&profile, &video, &transcript);
        assert_eq!(
            prompt,
            "Summarize.\n\nTitle: A Song\nChannel: Rick\n\
             URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\n\
             Transcript:\nnever gonna"
        );
    }
}
