//! Durable storage for the settings blob.
//!
//! The registry only needs `load` and `save` of an opaque JSON value. Two
//! implementations ship with the crate: [`JsonFileStore`] for real use and
//! [`MemoryStore`] for tests and embedding hosts that persist elsewhere.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{Result, TldwError};

/// Key-value store holding the serialized settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the stored blob, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<Value>>;

    /// Replace the stored blob.
    async fn save(&self, blob: &Value) -> Result<()>;
}

// ============================================================================
// JSON file
// ============================================================================

/// Settings stored as a pretty-printed JSON file.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target.
/// A file that fails to parse is never replaced: loading it is an error.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    /// A missing file loads as `None`. A file that is not valid JSON is an
    /// error and is left untouched on disk.
    async fn load(&self) -> Result<Option<Value>> {
        let path = &self.path;
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(TldwError::Persistence(format!(
                    "failed to read settings file {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            warn!(path = %path.display(), error = %e, "settings file is not valid JSON");
            TldwError::Persistence(format!(
                "settings file {} is not valid JSON ({e}); fix or remove it",
                path.display()
            ))
        })
    }

    async fn save(&self, blob: &Value) -> Result<()> {
        let path = &self.path;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TldwError::Persistence(format!(
                    "failed to create settings dir {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(blob)
            .map_err(|e| TldwError::Persistence(format!("failed to serialize settings: {e}")))?;
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            TldwError::Persistence(format!(
                "failed to write settings file {}: {e}",
                tmp_path.display()
            ))
        })?;
        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            TldwError::Persistence(format!(
                "failed to rename settings file {} → {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })?;

        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// In-memory store. Can be told to fail saves to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<Value>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored blob.
    pub fn with_blob(blob: Value) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
            ..Default::default()
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Currently stored blob.
    pub async fn blob(&self) -> Option<Value> {
        self.blob.lock().await.clone()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<Option<Value>> {
        Ok(self.blob.lock().await.clone())
    }

    async fn save(&self, blob: &Value) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(TldwError::Persistence("store is read-only".to_string()));
        }
        *self.blob.lock().await = Some(blob.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
