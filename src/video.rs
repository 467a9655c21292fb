//! YouTube video identifiers.

use std::fmt;

use reqwest::Url;

use crate::{Result, TldwError};

/// Length of a YouTube video id.
const ID_LEN: usize = 11;

/// Hosts that serve YouTube watch pages.
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

/// Path prefixes that carry the id as the next segment.
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// A validated 11-character YouTube video id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a watch URL, short link, shorts/embed/live URL, or bare id.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if is_valid_id(input) {
            return Ok(Self(input.to_string()));
        }

        let url = Url::parse(input)
            .or_else(|_| Url::parse(&format!("https://{input}")))
            .map_err(|_| invalid(input))?;
        let host = url.host_str().unwrap_or_default();

        let candidate = if host == "youtu.be" {
            url.path_segments().and_then(|mut s| s.next()).map(str::to_string)
        } else if YOUTUBE_HOSTS.contains(&host) {
            let mut segments = url.path_segments().into_iter().flatten();
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        } else {
            None
        };

        candidate
            .filter(|id| is_valid_id(id))
            .map(Self)
            .ok_or_else(|| invalid(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_id(s: &str) -> bool {
    s.len() == ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn invalid(input: &str) -> TldwError {
    TldwError::Validation(format!("not a YouTube video URL or id: {input:?}"))
}
