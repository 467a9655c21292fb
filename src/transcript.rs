//! Transcript types and the source trait.
//!
//! Fetching transcripts (scraping the watch page, caption tracks, ...) lives
//! outside this crate. Hosts plug in an implementation of
//! [`TranscriptSource`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::video::VideoId;

/// Video metadata shown alongside a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    /// Channel URL, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,
}

/// One caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub text: String,
    /// Start offset in milliseconds.
    pub offset_ms: u64,
    pub duration_ms: u64,
}

/// A video's captions with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub metadata: VideoMetadata,
    pub lines: Vec<TranscriptLine>,
}

impl Transcript {
    /// Caption text joined into one block, one line per caption.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text.trim().is_empty())
    }
}

/// Provides transcripts for videos.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video: &VideoId) -> Result<Transcript>;
}
