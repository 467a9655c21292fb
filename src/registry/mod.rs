//! Settings registry: providers, models, selection, and generation profile.
//!
//! [`SettingsRegistry`] is the single owner of the configuration. Every
//! mutator validates first, applies the change in memory, then writes the
//! whole blob through its [`SettingsStore`]. A failed write does not undo the
//! in-memory change and is not returned to the caller: it is logged, counted
//! in [`telemetry::PERSIST_FAILURES_TOTAL`], and sent to the registry's
//! [`Notifier`].
//!
//! There is no global instance. Hosts create one registry at startup and hand
//! it to whatever needs it.

pub mod migrate;
pub mod notify;
pub mod profile;
pub mod store;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::telemetry;
use crate::{Result, TldwError};

pub use migrate::LoadSource;
pub use notify::{CollectingNotifier, LogNotifier, Notifier};
pub use profile::{GenerationProfile, parse_max_tokens, parse_temperature};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use types::{
    Model, ModelConfig, ModelView, Provider, ProviderConfig, ProviderSummary, ProviderType,
    Settings,
};

/// In-memory configuration backed by a durable store.
pub struct SettingsRegistry {
    settings: Settings,
    source: LoadSource,
    store: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRegistry")
            .field("providers", &self.settings.providers.len())
            .field("selected_model_id", &self.settings.selected_model_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl SettingsRegistry {
    /// Load settings from `store`, reporting write failures as log events.
    pub async fn load(store: Arc<dyn SettingsStore>) -> Result<Self> {
        Self::load_with_notifier(store, Arc::new(LogNotifier)).await
    }

    /// Load settings from `store`, migrating the legacy format if found.
    ///
    /// A migrated blob is written back immediately; a current-format blob is
    /// not rewritten. Read failures are returned.
    pub async fn load_with_notifier(
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let loaded = migrate::decode(store.load().await?);
        let needs_persist = loaded.needs_persist();
        let registry = Self {
            source: loaded.source,
            settings: loaded.settings,
            store,
            notifier,
        };
        if needs_persist {
            metrics::counter!(telemetry::MIGRATIONS_TOTAL).increment(1);
            registry.persist().await;
        }
        info!(
            providers = registry.settings.providers.len(),
            source = ?registry.source,
            "settings loaded"
        );
        Ok(registry)
    }

    /// How the settings were obtained at load time.
    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    /// The authoritative settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Resolve the selection against all providers' models.
    ///
    /// Providers are scanned in stored order and the first model with the
    /// selected name wins. An empty or dangling selection yields `None`.
    pub fn selected_model(&self) -> Option<ModelView> {
        let name = self.settings.selected_model_id.as_deref()?;
        let mut matches = self
            .settings
            .providers
            .iter()
            .filter_map(|p| p.model(name).map(|m| (p, m)));
        let (provider, model) = matches.next()?;
        if let Some((other, _)) = matches.next() {
            debug!(
                model = name,
                chosen = %provider.name,
                also = %other.name,
                "selected model name exists under several providers"
            );
        }
        Some(ModelView::new(provider, model))
    }

    /// Snapshot of every provider with its models.
    pub fn providers(&self) -> Vec<Provider> {
        self.settings.providers.clone()
    }

    /// Look up a provider by name.
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.settings.providers.iter().find(|p| p.name == name)
    }

    /// Every model across all providers, each paired with its provider.
    pub fn models(&self) -> Vec<ModelView> {
        self.settings
            .providers
            .iter()
            .flat_map(|p| p.models.iter().map(move |m| ModelView::new(p, m)))
            .collect()
    }

    /// Prompt and sampling parameters.
    pub fn generation_profile(&self) -> GenerationProfile {
        GenerationProfile {
            custom_prompt: self.settings.custom_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Store `name` as the selection without checking that it exists.
    ///
    /// An empty name clears the selection.
    pub async fn set_selected_model(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.settings.selected_model_id = if name.is_empty() { None } else { Some(name) };
        self.persist().await;
    }

    /// Alias of [`set_selected_model`](Self::set_selected_model).
    pub async fn select_model(&mut self, name: impl Into<String>) {
        self.set_selected_model(name).await;
    }

    pub async fn clear_selection(&mut self) {
        self.settings.selected_model_id = None;
        self.persist().await;
    }

    // ========================================================================
    // Providers
    // ========================================================================

    /// Add a provider with an empty model list.
    ///
    /// Any models in `config` are discarded. Fails with `Validation` when the
    /// name or type is missing or the name is taken.
    pub async fn add_provider(&mut self, config: ProviderConfig) -> Result<()> {
        let provider_type = require_identity(&config)?;
        if self.provider_index(&config.name).is_some() {
            return Err(TldwError::Validation(format!(
                "provider '{}' already exists",
                config.name
            )));
        }
        if !config.models.is_empty() {
            debug!(provider = %config.name, "ignoring models passed to add_provider");
        }

        if !provider_type.is_supported() {
            warn!(provider = %config.name, provider_type = %provider_type, "no adapter for this provider type");
        }
        info!(provider = %config.name, provider_type = %provider_type, "adding provider");
        self.settings.providers.push(Provider {
            name: config.name,
            provider_type,
            api_key: config.api_key,
            url: config.url,
            verified: config.verified,
            models: Vec::new(),
        });
        self.persist().await;
        Ok(())
    }

    /// Replace every field of an existing provider except its model list.
    pub async fn update_provider(&mut self, config: ProviderConfig) -> Result<()> {
        let idx = self.require_provider(&config.name)?;
        let provider_type = require_identity(&config)?;

        let provider = &mut self.settings.providers[idx];
        provider.provider_type = provider_type;
        provider.api_key = config.api_key;
        provider.url = config.url;
        provider.verified = config.verified;
        debug!(provider = %provider.name, "provider updated");
        self.persist().await;
        Ok(())
    }

    /// Delete a provider that owns no models.
    pub async fn delete_provider(&mut self, name: &str) -> Result<()> {
        let idx = self.require_provider(name)?;
        if !self.settings.providers[idx].models.is_empty() {
            return Err(TldwError::Conflict(format!(
                "provider '{name}' has associated models"
            )));
        }
        self.settings.providers.remove(idx);
        info!(provider = name, "provider deleted");
        self.persist().await;
        Ok(())
    }

    /// Overwrite a provider's API key and mark it unverified.
    ///
    /// Does not contact the provider; see
    /// [`verify_provider`](crate::summarizer::verify_provider).
    pub async fn save_provider_key(
        &mut self,
        provider_name: &str,
        key: impl Into<String>,
    ) -> Result<()> {
        let idx = self.require_provider(provider_name)?;
        let provider = &mut self.settings.providers[idx];
        provider.api_key = key.into();
        provider.verified = false;
        self.persist().await;
        Ok(())
    }

    /// Record the outcome of a connectivity test.
    pub async fn set_provider_verified(
        &mut self,
        provider_name: &str,
        verified: bool,
    ) -> Result<()> {
        let idx = self.require_provider(provider_name)?;
        self.settings.providers[idx].verified = verified;
        self.persist().await;
        Ok(())
    }

    // ========================================================================
    // Models
    // ========================================================================

    /// Add a model under an existing provider.
    pub async fn add_model(&mut self, model: ModelConfig) -> Result<()> {
        let idx = self.require_provider(&model.provider)?;
        if model.name.is_empty() {
            return Err(TldwError::Validation("model name is required".to_string()));
        }
        let provider = &mut self.settings.providers[idx];
        if provider.model(&model.name).is_some() {
            return Err(TldwError::Validation(format!(
                "model '{}' already exists for provider '{}'",
                model.name, provider.name
            )));
        }

        debug!(provider = %provider.name, model = %model.name, "adding model");
        provider.models.push(Model {
            name: model.name,
            display_name: model.display_name.unwrap_or_default(),
        });
        self.persist().await;
        Ok(())
    }

    /// Edit a model's label, or select `name` if the provider has no such
    /// model.
    ///
    /// This keeps the combined behaviour of a model picker whose free-text
    /// entry and edit form share one callback. New code should call
    /// [`relabel_model`](Self::relabel_model) or
    /// [`select_model`](Self::select_model) directly.
    pub async fn update_model(
        &mut self,
        name: &str,
        display_name: &str,
        provider_name: &str,
    ) -> Result<()> {
        let idx = self.require_provider(provider_name)?;
        if self.settings.providers[idx].model(name).is_some() {
            self.relabel_model(provider_name, name, display_name).await
        } else {
            self.select_model(name).await;
            Ok(())
        }
    }

    /// Replace the display label of an existing model.
    pub async fn relabel_model(
        &mut self,
        provider_name: &str,
        name: &str,
        display_name: &str,
    ) -> Result<()> {
        let idx = self.require_provider(provider_name)?;
        let model = self.settings.providers[idx]
            .models
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| {
                TldwError::NotFound(format!(
                    "model '{name}' not found for provider '{provider_name}'"
                ))
            })?;
        model.display_name = display_name.to_string();
        self.persist().await;
        Ok(())
    }

    /// Remove one model; clears the selection if it named this model.
    pub async fn delete_model(&mut self, provider_name: &str, name: &str) -> Result<()> {
        let idx = self.require_provider(provider_name)?;
        let models = &mut self.settings.providers[idx].models;
        let pos = models.iter().position(|m| m.name == name).ok_or_else(|| {
            TldwError::NotFound(format!(
                "model '{name}' not found for provider '{provider_name}'"
            ))
        })?;
        models.remove(pos);

        if self.settings.selected_model_id.as_deref() == Some(name) {
            debug!(model = name, "deleted model was selected, clearing selection");
            self.settings.selected_model_id = None;
        }
        self.persist().await;
        Ok(())
    }

    // ========================================================================
    // Generation profile
    // ========================================================================

    pub async fn update_custom_prompt(&mut self, text: impl Into<String>) {
        self.settings.custom_prompt = text.into();
        self.persist().await;
    }

    /// Stored as given; validate user text with
    /// [`parse_max_tokens`](profile::parse_max_tokens).
    pub async fn update_max_tokens(&mut self, max_tokens: u32) {
        self.settings.max_tokens = max_tokens;
        self.persist().await;
    }

    /// Stored as given, including non-finite values (which persist as
    /// `null` and reload as the default).
    pub async fn update_temperature(&mut self, temperature: f32) {
        self.settings.temperature = temperature;
        self.persist().await;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn provider_index(&self, name: &str) -> Option<usize> {
        self.settings.providers.iter().position(|p| p.name == name)
    }

    fn require_provider(&self, name: &str) -> Result<usize> {
        self.provider_index(name)
            .ok_or_else(|| TldwError::NotFound(format!("provider '{name}' not found")))
    }

    /// Write the current settings; failures become notices.
    async fn persist(&self) {
        let result = match migrate::encode(&self.settings) {
            Ok(blob) => self.store.save(&blob).await,
            Err(e) => Err(TldwError::Persistence(e.to_string())),
        };
        if let Err(e) = result {
            warn!(error = %e, "settings write failed, keeping in-memory changes");
            metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL).increment(1);
            self.notifier.notify(&format!("Failed to save settings: {e}"));
        }
    }
}

/// Name and type are both required on add and update.
fn require_identity(config: &ProviderConfig) -> Result<ProviderType> {
    if config.name.is_empty() {
        return Err(TldwError::Validation("provider name is required".to_string()));
    }
    config
        .provider_type
        .clone()
        .ok_or_else(|| TldwError::Validation(format!("provider '{}' needs a type", config.name)))
}
