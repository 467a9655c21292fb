//! Builds a [`SummaryProvider`] for a resolved model.
//!
//! The factory holds only an HTTP client shared by every adapter it builds.
//! Dispatch is on the provider type; the custom endpoint URL is forwarded to
//! OpenAI-compatible providers only. Credentials are not checked here.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::traits::{AdapterConfig, SummaryProvider};
use super::{AnthropicProvider, GeminiProvider, OpenAiProvider};
use crate::registry::{GenerationProfile, ModelView, ProviderType};
use crate::{Result, TldwError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Constructs adapters from registry state.
#[derive(Clone)]
pub struct ProviderFactory {
    http: Client,
}

impl ProviderFactory {
    /// Create a factory whose adapters time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TldwError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(http))
    }

    /// Create a factory sharing an existing connection pool.
    pub fn with_http_client(http: Client) -> Self {
        Self { http }
    }

    /// Build the adapter for `model` using the given generation profile.
    ///
    /// Fails with `UnsupportedProvider` when the provider type is not one of
    /// `openai`, `anthropic`, `gemini`.
    pub fn create(
        &self,
        model: &ModelView,
        profile: &GenerationProfile,
    ) -> Result<Box<dyn SummaryProvider>> {
        let provider = &model.provider;
        let mut config = AdapterConfig {
            api_key: provider.api_key.clone(),
            model: model.name.clone(),
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
            base_url: None,
        };
        debug!(provider = %provider.name, provider_type = %provider.provider_type, model = %model.name, "building adapter");

        let adapter: Box<dyn SummaryProvider> = match &provider.provider_type {
            ProviderType::OpenAi => {
                config.base_url = provider.url.clone().filter(|u| !u.is_empty());
                Box::new(OpenAiProvider::new(config, self.http.clone()))
            }
            ProviderType::Anthropic => Box::new(AnthropicProvider::new(config, self.http.clone())),
            ProviderType::Gemini => Box::new(GeminiProvider::new(config, self.http.clone())),
            ProviderType::Other(kind) => {
                return Err(TldwError::UnsupportedProvider(kind.clone()));
            }
        };
        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Model, Provider};

    fn profile() -> GenerationProfile {
        GenerationProfile {
            custom_prompt: "p".into(),
            max_tokens: 256,
            temperature: 0.7,
        }
    }

    fn view(provider_type: ProviderType, url: Option<&str>) -> ModelView {
        let mut provider = Provider::new("P", provider_type);
        provider.api_key = "key-123".into();
        provider.url = url.map(String::from);
        let model = Model::new("model-x");
        ModelView::new(&provider.clone().with_model(model.clone()), &model)
    }

    fn factory() -> ProviderFactory {
        ProviderFactory::with_http_client(Client::new())
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let result = factory().create(&view(ProviderType::Other("cohere".into()), None), &profile());
        match result {
            Err(TldwError::UnsupportedProvider(kind)) => assert_eq!(kind, "cohere"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected UnsupportedProvider"),
        }
    }

    #[test]
    fn each_supported_type_forwards_parameters() {
        for provider_type in [
            ProviderType::OpenAi,
            ProviderType::Anthropic,
            ProviderType::Gemini,
        ] {
            let adapter = factory()
                .create(&view(provider_type.clone(), None), &profile())
                .unwrap();
            assert_eq!(adapter.provider_type(), provider_type);
            let config = adapter.config();
            assert_eq!(config.api_key, "key-123");
            assert_eq!(config.model, "model-x");
            assert_eq!(config.max_tokens, 256);
            assert_eq!(config.temperature, 0.7);
        }
    }

    #[test]
    fn url_forwarded_for_openai_only() {
        let url = Some("http://localhost:1234/v1");

        let openai = factory()
            .create(&view(ProviderType::OpenAi, url), &profile())
            .unwrap();
        assert_eq!(openai.config().base_url.as_deref(), url);

        for provider_type in [ProviderType::Anthropic, ProviderType::Gemini] {
            let adapter = factory()
                .create(&view(provider_type, url), &profile())
                .unwrap();
            assert!(adapter.config().base_url.is_none());
        }
    }

    #[test]
    fn empty_url_is_not_an_override() {
        let adapter = factory()
            .create(&view(ProviderType::OpenAi, Some("")), &profile())
            .unwrap();
        assert!(adapter.config().base_url.is_none());
    }
}
