//! tldw - YouTube video summaries through pluggable LLM providers
//!
//! The heart of the crate is the [`SettingsRegistry`]: providers with their
//! credentials and models, the globally selected model, and the generation
//! profile (prompt, max tokens, temperature). The registry persists through a
//! [`SettingsStore`] and migrates the legacy single-key settings format on
//! load. At summarization time a [`ProviderFactory`] turns the selected model
//! into an executable [`SummaryProvider`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tldw::{JsonFileStore, ModelConfig, ProviderConfig, ProviderType, SettingsRegistry};
//!
//! #[tokio::main]
//! async fn main() -> tldw::Result<()> {
//!     let store = Arc::new(JsonFileStore::new("settings.json"));
//!     let mut registry = SettingsRegistry::load(store).await?;
//!
//!     registry
//!         .add_provider(
//!             ProviderConfig::new("Local", ProviderType::OpenAi)
//!                 .url("http://localhost:11434/v1"),
//!         )
//!         .await?;
//!     registry.add_model(ModelConfig::new("Local", "llama3.1")).await?;
//!     registry.select_model("llama3.1").await;
//!
//!     let selected = registry.selected_model().expect("just selected");
//!     println!("{} via {}", selected.label(), selected.provider.name);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod providers;
pub mod registry;
pub mod summarizer;
pub mod telemetry;
pub mod transcript;
pub mod video;

// Re-export main types at crate root
pub use error::{Result, TldwError};
pub use providers::{AdapterConfig, ProviderFactory, SummaryProvider};
pub use registry::{
    CollectingNotifier, GenerationProfile, JsonFileStore, LoadSource, LogNotifier, MemoryStore,
    Model, ModelConfig, ModelView, Notifier, Provider, ProviderConfig, ProviderSummary,
    ProviderType, Settings, SettingsRegistry, SettingsStore, parse_max_tokens, parse_temperature,
};
pub use summarizer::{Summarizer, Summary, verify_provider};
pub use transcript::{Transcript, TranscriptLine, TranscriptSource, VideoMetadata};
pub use video::VideoId;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
