//! tldw: manage summarization providers and summarize videos.
//!
//! Thin command-line front end over [`SettingsRegistry`]. Every subcommand
//! loads the settings file, runs one registry operation, and exits.
//!
//! Build: `cargo build --bin tldw --features cli`

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tldw::config::{Config, env_api_key};
use tldw::{
    JsonFileStore, ModelConfig, ProviderConfig, ProviderFactory, ProviderType, SettingsRegistry,
    Summarizer, Transcript, TranscriptLine, TranscriptSource, VideoId, VideoMetadata,
    parse_max_tokens, parse_temperature, verify_provider,
};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tldw", version = tldw::PKG_VERSION, about = "summarize YouTube videos with LLMs")]
struct Args {
    /// path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// settings file (overrides the config file)
    #[arg(long, env = "TLDW_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// provider management
    #[command(subcommand)]
    Provider(ProviderCommand),
    /// model management
    #[command(subcommand)]
    Model(ModelCommand),
    /// prompt and sampling parameters
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// summarize a video from a local transcript file
    Summarize {
        /// video URL or id
        video: String,
        /// transcript file: plain text (one caption per line) or JSON
        #[arg(long)]
        transcript: PathBuf,
        /// video title, for plain-text transcripts
        #[arg(long, default_value = "")]
        title: String,
        /// channel name, for plain-text transcripts
        #[arg(long, default_value = "")]
        author: String,
    },
}

#[derive(Subcommand)]
enum ProviderCommand {
    /// list providers
    List,
    /// add a provider
    Add {
        name: String,
        /// openai, anthropic, or gemini
        #[arg(long = "type")]
        provider_type: ProviderType,
        #[arg(long, default_value = "")]
        api_key: String,
        /// endpoint override for OpenAI-compatible servers
        #[arg(long)]
        url: Option<String>,
    },
    /// change a provider's type, key, or url (models are kept)
    Update {
        name: String,
        #[arg(long = "type")]
        provider_type: Option<ProviderType>,
        #[arg(long)]
        api_key: Option<String>,
        /// endpoint override; pass an empty string to remove it
        #[arg(long)]
        url: Option<String>,
    },
    /// delete a provider that has no models
    Delete { name: String },
    /// store an API key (marks the provider unverified)
    SetKey {
        name: String,
        /// key to store; omit with --from-env
        key: Option<String>,
        /// read the key from the provider type's environment variable
        #[arg(long, conflicts_with = "key")]
        from_env: bool,
    },
    /// test the stored key against the provider
    Test { name: String },
}

#[derive(Subcommand)]
enum ModelCommand {
    /// list models across providers
    List,
    /// add a model to a provider
    Add {
        provider: String,
        name: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// change a model's display name
    Relabel {
        provider: String,
        name: String,
        display_name: String,
    },
    /// remove a model
    Delete { provider: String, name: String },
    /// make a model the active one
    Select { name: String },
    /// clear the active model
    Clear,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// show prompt and sampling parameters
    Show,
    /// replace the custom prompt
    Prompt { text: String },
    /// set max output tokens
    MaxTokens { value: String },
    /// set temperature (0-2)
    Temperature { value: String },
}

// ── transcript files ────────────────────────────────────────────────

/// Reads a transcript from disk regardless of the requested video.
struct FileTranscripts {
    path: PathBuf,
    metadata: VideoMetadata,
}

#[async_trait]
impl TranscriptSource for FileTranscripts {
    async fn fetch(&self, _video: &VideoId) -> tldw::Result<Transcript> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tldw::TldwError::Configuration(format!(
                "failed to read transcript {}: {e}",
                self.path.display()
            ))
        })?;
        if self.path.extension().is_some_and(|ext| ext == "json") {
            return Ok(serde_json::from_str(&content)?);
        }
        let lines = content
            .lines()
            .map(|text| TranscriptLine {
                text: text.to_string(),
                offset_ms: 0,
                duration_ms: 0,
            })
            .collect();
        Ok(Transcript {
            metadata: self.metadata.clone(),
            lines,
        })
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> tldw::Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let settings_path = args.settings.unwrap_or(config.settings.path);
    let store = Arc::new(JsonFileStore::new(settings_path));
    let mut registry = SettingsRegistry::load(store).await?;
    let factory = ProviderFactory::new(config.http.timeout_secs)?;

    match args.command {
        Command::Provider(cmd) => provider_command(&mut registry, &factory, cmd).await,
        Command::Model(cmd) => model_command(&mut registry, cmd).await,
        Command::Profile(cmd) => profile_command(&mut registry, cmd).await,
        Command::Summarize {
            video,
            transcript,
            title,
            author,
        } => {
            let source = FileTranscripts {
                path: transcript,
                metadata: VideoMetadata {
                    title,
                    author,
                    channel_url: None,
                },
            };
            let summarizer = Summarizer::new(Arc::new(source), factory);
            let summary = summarizer.summarize(&registry, &video).await?;
            println!("{}", summary.content);
            Ok(())
        }
    }
}

async fn provider_command(
    registry: &mut SettingsRegistry,
    factory: &ProviderFactory,
    cmd: ProviderCommand,
) -> tldw::Result<()> {
    match cmd {
        ProviderCommand::List => {
            for p in registry.providers() {
                let status = if p.verified { "verified" } else { "unverified" };
                let key = if p.api_key.is_empty() { "no key" } else { "key set" };
                println!("{} ({}, {key}, {status})", p.name, p.provider_type);
                if let Some(url) = &p.url {
                    println!("  url: {url}");
                }
                for m in &p.models {
                    println!("  - {} [{}]", m.label(), m.name);
                }
            }
            Ok(())
        }
        ProviderCommand::Add {
            name,
            provider_type,
            api_key,
            url,
        } => {
            let mut config = ProviderConfig::new(&name, provider_type).api_key(api_key);
            config.url = url;
            registry.add_provider(config).await?;
            println!("added provider {name}");
            Ok(())
        }
        ProviderCommand::Update {
            name,
            provider_type,
            api_key,
            url,
        } => {
            let existing = registry.provider(&name).ok_or_else(|| {
                tldw::TldwError::NotFound(format!("provider '{name}' not found"))
            })?;
            let mut config = ProviderConfig::from(existing);
            if let Some(provider_type) = provider_type {
                config.provider_type = Some(provider_type);
                config.verified = false;
            }
            if let Some(api_key) = api_key {
                config.api_key = api_key;
                config.verified = false;
            }
            if let Some(url) = url {
                config.url = Some(url).filter(|u| !u.is_empty());
                config.verified = false;
            }
            registry.update_provider(config).await?;
            println!("updated provider {name}");
            Ok(())
        }
        ProviderCommand::Delete { name } => {
            registry.delete_provider(&name).await?;
            println!("deleted provider {name}");
            Ok(())
        }
        ProviderCommand::SetKey {
            name,
            key,
            from_env,
        } => {
            let key = if from_env {
                let provider = registry.provider(&name).ok_or_else(|| {
                    tldw::TldwError::NotFound(format!("provider '{name}' not found"))
                })?;
                env_api_key(&provider.provider_type).ok_or_else(|| {
                    tldw::TldwError::Configuration(format!(
                        "no API key in the environment for {} providers",
                        provider.provider_type
                    ))
                })?
            } else {
                key.unwrap_or_default()
            };
            registry.save_provider_key(&name, key).await?;
            println!("saved key for {name} (run `tldw provider test {name}` to verify)");
            Ok(())
        }
        ProviderCommand::Test { name } => {
            if verify_provider(registry, factory, &name).await? {
                println!("{name}: connection ok");
            } else {
                println!("{name}: connection failed");
            }
            Ok(())
        }
    }
}

async fn model_command(registry: &mut SettingsRegistry, cmd: ModelCommand) -> tldw::Result<()> {
    match cmd {
        ModelCommand::List => {
            let selected = registry.selected_model();
            for m in registry.models() {
                let marker = match &selected {
                    Some(s) if s.name == m.name && s.provider.name == m.provider.name => "*",
                    _ => " ",
                };
                println!("{marker} {} [{}] via {}", m.label(), m.name, m.provider.name);
            }
            if selected.is_none()
                && let Some(name) = &registry.settings().selected_model_id
            {
                println!("selection '{name}' does not match any model");
            }
            Ok(())
        }
        ModelCommand::Add {
            provider,
            name,
            display_name,
        } => {
            let mut model = ModelConfig::new(&provider, &name);
            model.display_name = display_name;
            registry.add_model(model).await?;
            println!("added model {name} to {provider}");
            Ok(())
        }
        ModelCommand::Relabel {
            provider,
            name,
            display_name,
        } => {
            registry
                .relabel_model(&provider, &name, &display_name)
                .await?;
            println!("relabeled {name} in {provider} as {display_name}");
            Ok(())
        }
        ModelCommand::Delete { provider, name } => {
            registry.delete_model(&provider, &name).await?;
            println!("deleted model {name} from {provider}");
            Ok(())
        }
        ModelCommand::Select { name } => {
            registry.select_model(&name).await;
            if registry.selected_model().is_none() {
                println!("selected {name} (no provider has this model yet)");
            } else {
                println!("selected {name}");
            }
            Ok(())
        }
        ModelCommand::Clear => {
            registry.clear_selection().await;
            println!("cleared model selection");
            Ok(())
        }
    }
}

async fn profile_command(
    registry: &mut SettingsRegistry,
    cmd: ProfileCommand,
) -> tldw::Result<()> {
    match cmd {
        ProfileCommand::Show => {
            let profile = registry.generation_profile();
            println!("max tokens:  {}", profile.max_tokens);
            println!("temperature: {}", profile.temperature);
            println!("prompt:\n{}", profile.custom_prompt);
        }
        ProfileCommand::Prompt { text } => registry.update_custom_prompt(text).await,
        ProfileCommand::MaxTokens { value } => {
            registry.update_max_tokens(parse_max_tokens(&value)?).await;
        }
        ProfileCommand::Temperature { value } => {
            registry
                .update_temperature(parse_temperature(&value)?)
                .await;
        }
    }
    Ok(())
}
