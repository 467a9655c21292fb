use std::sync::Arc;

use tldw::{
    MemoryStore, Model, ModelConfig, ProviderConfig, ProviderType, SettingsRegistry, TldwError,
};

/// Registry over an empty in-memory store, with the default providers removed
/// so each test starts from a blank slate.
async fn empty_registry() -> (SettingsRegistry, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_blob(serde_json::json!({
        "settings": { "providers": [], "selectedModelId": null }
    })));
    let registry = SettingsRegistry::load(store.clone()).await.unwrap();
    (registry, store)
}

async fn with_provider(registry: &mut SettingsRegistry, name: &str, provider_type: ProviderType) {
    registry
        .add_provider(ProviderConfig::new(name, provider_type))
        .await
        .unwrap();
}

// ============================================================================
// Providers
// ============================================================================

#[tokio::test]
async fn add_provider_starts_with_no_models() {
    let (mut registry, _) = empty_registry().await;
    let config = ProviderConfig::new("OpenRouter", ProviderType::OpenAi)
        .api_key("sk-or")
        .url("https://openrouter.ai/api/v1")
        .models(vec![Model::new("smuggled"), Model::new("also-smuggled")]);
    registry.add_provider(config).await.unwrap();

    let providers = registry.providers();
    let matching: Vec<_> = providers.iter().filter(|p| p.name == "OpenRouter").collect();
    assert_eq!(matching.len(), 1);
    let provider = matching[0];
    assert!(provider.models.is_empty());
    assert_eq!(provider.api_key, "sk-or");
    assert_eq!(provider.url.as_deref(), Some("https://openrouter.ai/api/v1"));
    assert!(registry.models().is_empty());
}

#[tokio::test]
async fn add_provider_requires_name_and_type() {
    let (mut registry, _) = empty_registry().await;

    let no_name = ProviderConfig::new("", ProviderType::Gemini);
    assert!(matches!(
        registry.add_provider(no_name).await,
        Err(TldwError::Validation(_))
    ));

    let no_type = ProviderConfig {
        name: "Typeless".into(),
        ..Default::default()
    };
    assert!(matches!(
        registry.add_provider(no_type).await,
        Err(TldwError::Validation(_))
    ));

    assert!(registry.providers().is_empty());
}

#[tokio::test]
async fn duplicate_provider_name_rejected_and_state_unchanged() {
    let (mut registry, _) = empty_registry().await;
    registry
        .add_provider(ProviderConfig::new("Main", ProviderType::OpenAi).api_key("first"))
        .await
        .unwrap();
    let before = registry.settings().clone();

    let err = registry
        .add_provider(ProviderConfig::new("Main", ProviderType::Anthropic).api_key("second"))
        .await
        .unwrap_err();
    assert!(matches!(err, TldwError::Validation(_)));
    assert_eq!(registry.settings(), &before);
}

#[tokio::test]
async fn provider_names_are_case_sensitive() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "main", ProviderType::OpenAi).await;
    with_provider(&mut registry, "Main", ProviderType::OpenAi).await;
    assert_eq!(registry.providers().len(), 2);
}

#[tokio::test]
async fn update_provider_replaces_fields_but_keeps_models() {
    let (mut registry, _) = empty_registry().await;
    registry
        .add_provider(
            ProviderConfig::new("P", ProviderType::OpenAi)
                .api_key("old")
                .url("http://old"),
        )
        .await
        .unwrap();
    registry.add_model(ModelConfig::new("P", "m1")).await.unwrap();

    registry
        .update_provider(
            ProviderConfig::new("P", ProviderType::Anthropic)
                .api_key("new")
                .verified(true)
                .models(vec![]),
        )
        .await
        .unwrap();

    let provider = registry.provider("P").unwrap();
    assert_eq!(provider.provider_type, ProviderType::Anthropic);
    assert_eq!(provider.api_key, "new");
    assert!(provider.verified);
    assert!(provider.url.is_none());
    assert_eq!(provider.models, vec![Model::new("m1")]);
}

#[tokio::test]
async fn update_unknown_provider_is_not_found() {
    let (mut registry, _) = empty_registry().await;
    let err = registry
        .update_provider(ProviderConfig::new("Ghost", ProviderType::Gemini))
        .await
        .unwrap_err();
    assert!(matches!(err, TldwError::NotFound(_)));
}

#[tokio::test]
async fn delete_provider_with_models_conflicts() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.add_model(ModelConfig::new("P", "m")).await.unwrap();
    let before = registry.settings().clone();

    let err = registry.delete_provider("P").await.unwrap_err();
    assert!(matches!(err, TldwError::Conflict(_)));
    assert!(err.to_string().contains("has associated models"));
    assert_eq!(registry.settings(), &before);
}

#[tokio::test]
async fn delete_empty_provider_succeeds() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.delete_provider("P").await.unwrap();
    assert!(registry.provider("P").is_none());

    let err = registry.delete_provider("P").await.unwrap_err();
    assert!(matches!(err, TldwError::NotFound(_)));
}

#[tokio::test]
async fn save_provider_key_resets_verified() {
    let (mut registry, _) = empty_registry().await;
    registry
        .add_provider(
            ProviderConfig::new("P", ProviderType::OpenAi)
                .api_key("old")
                .verified(true),
        )
        .await
        .unwrap();
    assert!(registry.provider("P").unwrap().verified);

    registry.save_provider_key("P", "new-key").await.unwrap();
    let provider = registry.provider("P").unwrap();
    assert_eq!(provider.api_key, "new-key");
    assert!(!provider.verified);
}

#[tokio::test]
async fn save_provider_key_unknown_is_not_found() {
    let (mut registry, _) = empty_registry().await;
    let err = registry.save_provider_key("Ghost", "k").await.unwrap_err();
    assert!(matches!(err, TldwError::NotFound(_)));
}

#[tokio::test]
async fn set_provider_verified_records_outcome() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.set_provider_verified("P", true).await.unwrap();
    assert!(registry.provider("P").unwrap().verified);
}

// ============================================================================
// Models
// ============================================================================

#[tokio::test]
async fn add_model_unknown_provider_is_not_found() {
    let (mut registry, _) = empty_registry().await;
    let err = registry
        .add_model(ModelConfig::new("Ghost", "m"))
        .await
        .unwrap_err();
    assert!(matches!(err, TldwError::NotFound(_)));
}

#[tokio::test]
async fn add_model_requires_name() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    let err = registry
        .add_model(ModelConfig::new("P", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, TldwError::Validation(_)));
}

#[tokio::test]
async fn model_names_unique_per_provider_only() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::OpenAi).await;
    with_provider(&mut registry, "Q", ProviderType::OpenAi).await;

    registry.add_model(ModelConfig::new("P", "m")).await.unwrap();
    let err = registry
        .add_model(ModelConfig::new("P", "m").display_name("again"))
        .await
        .unwrap_err();
    assert!(matches!(err, TldwError::Validation(_)));

    registry.add_model(ModelConfig::new("Q", "m")).await.unwrap();
    assert_eq!(registry.models().len(), 2);
}

#[tokio::test]
async fn models_are_denormalized_with_provider() {
    let (mut registry, _) = empty_registry().await;
    registry
        .add_provider(ProviderConfig::new("P", ProviderType::OpenAi).api_key("k"))
        .await
        .unwrap();
    registry
        .add_model(ModelConfig::new("P", "gpt-4o").display_name("GPT-4o"))
        .await
        .unwrap();

    let models = registry.models();
    assert_eq!(models.len(), 1);
    let view = &models[0];
    assert_eq!(view.name, "gpt-4o");
    assert_eq!(view.label(), "GPT-4o");
    assert_eq!(view.provider.name, "P");
    assert_eq!(view.provider.api_key, "k");

    // Views are recomputed on read, so a key change is visible immediately.
    registry.save_provider_key("P", "k2").await.unwrap();
    assert_eq!(registry.models()[0].provider.api_key, "k2");
}

#[tokio::test]
async fn update_model_relabels_existing() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.add_model(ModelConfig::new("P", "m")).await.unwrap();
    registry.set_selected_model("other").await;

    registry.update_model("m", "Nice Name", "P").await.unwrap();
    assert_eq!(registry.provider("P").unwrap().models[0].display_name, "Nice Name");
    assert_eq!(
        registry.settings().selected_model_id.as_deref(),
        Some("other")
    );
}

#[tokio::test]
async fn update_model_missing_name_only_selects() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.add_model(ModelConfig::new("P", "m")).await.unwrap();
    let providers_before = registry.providers();

    registry
        .update_model("custom-model", "ignored", "P")
        .await
        .unwrap();

    assert_eq!(
        registry.settings().selected_model_id.as_deref(),
        Some("custom-model")
    );
    assert_eq!(registry.providers(), providers_before);
    // Dangling selection resolves to nothing.
    assert!(registry.selected_model().is_none());
}

#[tokio::test]
async fn update_model_unknown_provider_is_not_found() {
    let (mut registry, _) = empty_registry().await;
    let err = registry.update_model("m", "M", "Ghost").await.unwrap_err();
    assert!(matches!(err, TldwError::NotFound(_)));
    assert!(registry.settings().selected_model_id.is_none());
}

#[tokio::test]
async fn delete_selected_model_clears_selection() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.add_model(ModelConfig::new("P", "a")).await.unwrap();
    registry.add_model(ModelConfig::new("P", "b")).await.unwrap();
    registry.select_model("a").await;

    registry.delete_model("P", "a").await.unwrap();
    assert!(registry.settings().selected_model_id.is_none());
    assert_eq!(registry.provider("P").unwrap().models, vec![Model::new("b")]);
}

#[tokio::test]
async fn delete_unselected_model_keeps_selection() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;
    registry.add_model(ModelConfig::new("P", "a")).await.unwrap();
    registry.add_model(ModelConfig::new("P", "b")).await.unwrap();
    registry.select_model("a").await;

    registry.delete_model("P", "b").await.unwrap();
    assert_eq!(registry.settings().selected_model_id.as_deref(), Some("a"));
    assert_eq!(registry.selected_model().unwrap().name, "a");
}

#[tokio::test]
async fn delete_model_misses_are_not_found() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "P", ProviderType::Gemini).await;

    assert!(matches!(
        registry.delete_model("Ghost", "m").await,
        Err(TldwError::NotFound(_))
    ));
    assert!(matches!(
        registry.delete_model("P", "m").await,
        Err(TldwError::NotFound(_))
    ));
}

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn selection_resolves_first_provider_in_order() {
    let (mut registry, _) = empty_registry().await;
    with_provider(&mut registry, "First", ProviderType::OpenAi).await;
    with_provider(&mut registry, "Second", ProviderType::Anthropic).await;
    registry
        .add_model(ModelConfig::new("Second", "shared"))
        .await
        .unwrap();
    registry
        .add_model(ModelConfig::new("First", "shared"))
        .await
        .unwrap();

    registry.set_selected_model("shared").await;
    let selected = registry.selected_model().unwrap();
    assert_eq!(selected.provider.name, "First");
    assert_eq!(selected.provider.provider_type, ProviderType::OpenAi);
}

#[tokio::test]
async fn set_selected_model_does_not_check_existence() {
    let (mut registry, _) = empty_registry().await;
    registry.set_selected_model("future-model").await;
    assert_eq!(
        registry.settings().selected_model_id.as_deref(),
        Some("future-model")
    );
    assert!(registry.selected_model().is_none());

    with_provider(&mut registry, "P", ProviderType::OpenAi).await;
    registry
        .add_model(ModelConfig::new("P", "future-model"))
        .await
        .unwrap();
    assert_eq!(registry.selected_model().unwrap().name, "future-model");
}

#[tokio::test]
async fn clear_selection() {
    let (mut registry, _) = empty_registry().await;
    registry.select_model("m").await;
    registry.clear_selection().await;
    assert!(registry.settings().selected_model_id.is_none());
}

// ============================================================================
// Generation profile
// ============================================================================

#[tokio::test]
async fn profile_setters_store_values_verbatim() {
    let (mut registry, store) = empty_registry().await;
    registry.update_custom_prompt("Bullet points only.").await;
    registry.update_max_tokens(0).await;
    registry.update_temperature(7.5).await;

    let profile = registry.generation_profile();
    assert_eq!(profile.custom_prompt, "Bullet points only.");
    assert_eq!(profile.max_tokens, 0);
    assert_eq!(profile.temperature, 7.5);

    let blob = store.blob().await.unwrap();
    assert_eq!(blob["settings"]["temperature"], 7.5);
}

#[tokio::test]
async fn non_finite_temperature_kept_in_memory() {
    let (mut registry, _) = empty_registry().await;
    registry.update_temperature(f32::NAN).await;
    assert!(registry.generation_profile().temperature.is_nan());
}
