//! Provider, model, and settings types.
//!
//! [`Provider`] and [`Model`] are the stored shapes: a provider owns its model
//! list directly and models carry no back-reference. [`ModelView`] is the
//! read-side shape that pairs a model with a snapshot of its provider; it is
//! rebuilt on every read and never written to the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Default prompt used when no custom prompt has been stored.
pub const DEFAULT_PROMPT: &str = "\
Summarize the following YouTube video as a structured Markdown note.

Start with a one-paragraph overview, then list the key points as bullets, \
then add a short \"Takeaways\" section. Quote the speaker only when the exact \
wording matters. Do not invent details that are not in the transcript.";

/// Default maximum output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 3000;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Model selected out of the box (and the one legacy settings assumed).
pub const DEFAULT_SELECTED_MODEL: &str = "gemini-2.0-flash";

// ============================================================================
// Provider type
// ============================================================================

/// Backend family of a provider.
///
/// Stored as a lowercase string. Strings outside the known set deserialize to
/// [`ProviderType::Other`] so a settings file written by a newer build still
/// loads; such providers are rejected later by the
/// [`ProviderFactory`](crate::providers::ProviderFactory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderType {
    /// OpenAI or any OpenAI-compatible endpoint.
    OpenAi,
    Anthropic,
    Gemini,
    /// Unrecognised type string, kept verbatim.
    Other(String),
}

impl ProviderType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Other(s) => s,
        }
    }

    /// Whether the factory can build an adapter for this type.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// An absent type decodes as an empty `Other`, which no adapter accepts.
impl Default for ProviderType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ProviderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "gemini" => Self::Gemini,
            _ => Self::Other(s),
        }
    }
}

impl From<ProviderType> for String {
    fn from(t: ProviderType) -> Self {
        match t {
            ProviderType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ProviderType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Stored shapes
// ============================================================================

/// A model entry as stored inside its provider.
///
/// On the wire `id` carries the model name (the durable identifier) and
/// `name` carries the display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "id", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "name", default, deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Display label, falling back to the name when no label is set.
    pub fn label(&self) -> &str {
        label_or_name(&self.display_name, &self.name)
    }
}

/// A configured AI backend with its models.
///
/// Sub-fields missing from a stored provider, or stored as `null`, take
/// their zero value; they are not filled from the default provider set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub provider_type: ProviderType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,
    /// Endpoint override; only honoured for OpenAI-compatible providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<Model>,
}

impl Provider {
    /// Create an unverified provider with no key and no models.
    pub fn new(name: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            name: name.into(),
            provider_type,
            api_key: String::new(),
            url: None,
            verified: false,
            models: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Provider fields without the model list.
    pub fn summary(&self) -> ProviderSummary {
        ProviderSummary {
            name: self.name.clone(),
            provider_type: self.provider_type.clone(),
            api_key: self.api_key.clone(),
            url: self.url.clone(),
            verified: self.verified,
        }
    }
}

/// The built-in provider set used for fresh installs and legacy migration.
pub fn default_providers() -> Vec<Provider> {
    vec![
        Provider::new("OpenAI", ProviderType::OpenAi)
            .with_model(Model::new("gpt-4o-mini").with_display_name("GPT-4o mini")),
        Provider::new("Anthropic", ProviderType::Anthropic).with_model(
            Model::new("claude-3-5-haiku-latest").with_display_name("Claude 3.5 Haiku"),
        ),
        Provider::new("Gemini", ProviderType::Gemini)
            .with_model(Model::new(DEFAULT_SELECTED_MODEL).with_display_name("Gemini 2.0 Flash")),
    ]
}

/// The full persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub providers: Vec<Provider>,
    pub selected_model_id: Option<String>,
    pub custom_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            selected_model_id: Some(DEFAULT_SELECTED_MODEL.to_string()),
            custom_prompt: DEFAULT_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

// ============================================================================
// Caller-facing shapes
// ============================================================================

/// Input for adding or updating a provider.
///
/// `provider_type` is optional so a half-filled form can be passed through and
/// rejected by the registry. `models` is accepted but never applied: model
/// lists only change through the model operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub provider_type: Option<ProviderType>,
    pub api_key: String,
    pub url: Option<String>,
    pub verified: bool,
    pub models: Vec<Model>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            name: name.into(),
            provider_type: Some(provider_type),
            ..Default::default()
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn models(mut self, models: Vec<Model>) -> Self {
        self.models = models;
        self
    }
}

impl From<&Provider> for ProviderConfig {
    fn from(p: &Provider) -> Self {
        Self {
            name: p.name.clone(),
            provider_type: Some(p.provider_type.clone()),
            api_key: p.api_key.clone(),
            url: p.url.clone(),
            verified: p.verified,
            models: p.models.clone(),
        }
    }
}

/// Input for adding a model under an existing provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelConfig {
    pub name: String,
    pub display_name: Option<String>,
    /// Name of the owning provider.
    pub provider: String,
}

impl ModelConfig {
    pub fn new(provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            provider: provider.into(),
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Snapshot of a provider's fields, without its models.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSummary {
    pub name: String,
    pub provider_type: ProviderType,
    pub api_key: String,
    pub url: Option<String>,
    pub verified: bool,
}

/// A model paired with a snapshot of its owning provider.
///
/// Derived on read; edits go through the registry, never through a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelView {
    pub name: String,
    pub display_name: String,
    pub provider: ProviderSummary,
}

impl ModelView {
    pub fn new(provider: &Provider, model: &Model) -> Self {
        Self {
            name: model.name.clone(),
            display_name: model.display_name.clone(),
            provider: provider.summary(),
        }
    }

    pub fn label(&self) -> &str {
        label_or_name(&self.display_name, &self.name)
    }
}

/// Decode `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn label_or_name<'a>(label: &'a str, name: &'a str) -> &'a str {
    if label.is_empty() { name } else { label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_type_known_strings() {
        assert_eq!(ProviderType::from("openai".to_string()), ProviderType::OpenAi);
        assert_eq!(
            ProviderType::from("anthropic".to_string()),
            ProviderType::Anthropic
        );
        assert_eq!(ProviderType::from("gemini".to_string()), ProviderType::Gemini);
    }

    #[test]
    fn provider_type_unknown_kept_verbatim() {
        let t: ProviderType = serde_json::from_str(r#""mistral""#).unwrap();
        assert_eq!(t, ProviderType::Other("mistral".to_string()));
        assert!(!t.is_supported());
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""mistral""#);
    }

    #[test]
    fn provider_type_is_case_sensitive() {
        let t: ProviderType = "OpenAI".parse().unwrap();
        assert_eq!(t, ProviderType::Other("OpenAI".to_string()));
    }

    #[test]
    fn model_wire_names() {
        let model = Model::new("gpt-4o").with_display_name("GPT-4o");
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json, serde_json::json!({"id": "gpt-4o", "name": "GPT-4o"}));
    }

    #[test]
    fn label_falls_back_to_name() {
        assert_eq!(Model::new("m").label(), "m");
        assert_eq!(Model::new("m").with_display_name("Label").label(), "Label");
    }

    #[test]
    fn provider_missing_subfields_take_zero_values() {
        let json = r#"{"name": "Local", "type": "openai"}"#;
        let provider: Provider = serde_json::from_str(json).unwrap();
        assert_eq!(provider.api_key, "");
        assert!(!provider.verified);
        assert!(provider.url.is_none());
        assert!(provider.models.is_empty());
    }

    #[test]
    fn provider_without_type_decodes_as_unsupported() {
        let json = r#"{"name": "Half", "apiKey": "k2", "verified": null}"#;
        let provider: Provider = serde_json::from_str(json).unwrap();
        assert_eq!(provider.provider_type, ProviderType::Other(String::new()));
        assert!(!provider.provider_type.is_supported());
        assert_eq!(provider.api_key, "k2");
        assert!(!provider.verified);
    }

    #[test]
    fn null_model_fields_decode_as_empty() {
        let model: Model = serde_json::from_str(r#"{"id": "gpt-4o", "name": null}"#).unwrap();
        assert_eq!(model, Model::new("gpt-4o"));
        assert_eq!(model.label(), "gpt-4o");
    }

    #[test]
    fn provider_url_omitted_when_none() {
        let json = serde_json::to_value(Provider::new("p", ProviderType::Gemini)).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["type"], "gemini");
        assert_eq!(json["apiKey"], "");
    }

    #[test]
    fn default_settings_select_a_default_model() {
        let settings = Settings::default();
        let selected = settings.selected_model_id.as_deref().unwrap();
        assert!(
            settings
                .providers
                .iter()
                .any(|p| p.model(selected).is_some())
        );
        assert_eq!(settings.providers.len(), 3);
        assert!(settings.providers.iter().all(|p| !p.verified));
    }
}
