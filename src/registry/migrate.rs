//! Settings blob decoding and legacy migration.
//!
//! Two stored shapes are recognised:
//!
//! - **Current**: `{ "settings": { "providers": [...], "selectedModelId", ... } }`
//! - **Legacy**: a single Gemini key, `{ "geminiApiKey", "selectedModel",
//!   "customPrompt", "maxTokens", "temperature" }`
//!
//! Either shape may appear wrapped in `"settings"` or flat. Current-shape
//! blobs are merged against defaults one top-level field at a time; nested
//! values are taken as they are.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::types::{Provider, ProviderType, Settings};
use crate::Result;

/// Top-level key the current format nests settings under.
const SETTINGS_KEY: &str = "settings";

/// Field whose presence marks the legacy single-provider format.
const LEGACY_KEY_FIELD: &str = "geminiApiKey";

/// How a stored blob was turned into [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing usable was stored; defaults apply.
    Defaults,
    /// Current format, merged against defaults.
    Current,
    /// Legacy format converted; the caller must persist the result.
    Migrated,
}

/// Decoded settings plus where they came from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub settings: Settings,
    pub source: LoadSource,
}

impl Loaded {
    pub fn needs_persist(&self) -> bool {
        self.source == LoadSource::Migrated
    }
}

/// Decode a stored blob.
pub fn decode(blob: Option<Value>) -> Loaded {
    let Some(blob) = blob else {
        return defaults();
    };
    let Some(fields) = settings_object(blob) else {
        warn!("stored settings are not a JSON object, using defaults");
        return defaults();
    };

    if is_legacy(&fields) {
        info!("migrating legacy single-provider settings");
        Loaded {
            settings: migrate_legacy(&fields),
            source: LoadSource::Migrated,
        }
    } else {
        Loaded {
            settings: merge_current(&fields),
            source: LoadSource::Current,
        }
    }
}

/// Encode settings in the current wrapped format.
pub fn encode(settings: &Settings) -> Result<Value> {
    Ok(json!({ SETTINGS_KEY: serde_json::to_value(settings)? }))
}

fn defaults() -> Loaded {
    Loaded {
        settings: Settings::default(),
        source: LoadSource::Defaults,
    }
}

/// Unwrap `{"settings": {...}}`, or take a flat object as-is.
fn settings_object(blob: Value) -> Option<Map<String, Value>> {
    match blob {
        Value::Object(mut top) => match top.remove(SETTINGS_KEY) {
            Some(Value::Object(inner)) => Some(inner),
            Some(other) => {
                top.insert(SETTINGS_KEY.to_string(), other);
                Some(top)
            }
            None => Some(top),
        },
        _ => None,
    }
}

fn is_legacy(fields: &Map<String, Value>) -> bool {
    fields.contains_key(LEGACY_KEY_FIELD) && !fields.contains_key("providers")
}

fn migrate_legacy(fields: &Map<String, Value>) -> Settings {
    let defaults = Settings::default();
    let key = fields
        .get(LEGACY_KEY_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut providers = defaults.providers;
    if let Some(gemini) = providers
        .iter_mut()
        .find(|p| p.provider_type == ProviderType::Gemini)
    {
        gemini.api_key = key;
        gemini.verified = false;
    }

    Settings {
        providers,
        selected_model_id: field(fields, "selectedModel", defaults.selected_model_id),
        custom_prompt: field(fields, "customPrompt", defaults.custom_prompt),
        max_tokens: field(fields, "maxTokens", defaults.max_tokens),
        temperature: field(fields, "temperature", defaults.temperature),
    }
}

fn merge_current(fields: &Map<String, Value>) -> Settings {
    let defaults = Settings::default();
    Settings {
        providers: providers(fields, defaults.providers),
        selected_model_id: field(fields, "selectedModelId", defaults.selected_model_id),
        custom_prompt: field(fields, "customPrompt", defaults.custom_prompt),
        max_tokens: field(fields, "maxTokens", defaults.max_tokens),
        temperature: field(fields, "temperature", defaults.temperature),
    }
}

/// Decode the provider list one entry at a time.
///
/// An entry that still fails to decode is dropped on its own so the rest of
/// the stored providers and keys survive. Only a `providers` value that is
/// not a list falls back to the default set.
fn providers(fields: &Map<String, Value>, default: Vec<Provider>) -> Vec<Provider> {
    let Some(value) = fields.get("providers") else {
        return default;
    };
    let Some(entries) = value.as_array() else {
        warn!(field = "providers", "ignoring malformed settings field");
        return default;
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Provider::deserialize(entry) {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!(index, error = %e, "dropping unreadable stored provider");
                None
            }
        })
        .collect()
}

/// Present field wins, even if empty. A value of the wrong type counts as
/// missing.
fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, default: T) -> T {
    match fields.get(key) {
        None => default,
        Some(value) => match T::deserialize(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(field = key, error = %e, "ignoring malformed settings field");
                default
            }
        },
    }
}
