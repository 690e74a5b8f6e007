//! Configuration for Chorus.
//!
//! The raw, boundary-level shape ([`ChorusConfig`]) mirrors `~/.chorus/config.toml`
//! and keeps every field optional. [`ResolvedConfig`] is built once at process
//! start and handed by reference to the engine; nothing reads configuration
//! from global state afterwards.
//!
//! ```toml
//! [panes]
//! count = 3
//! default_providers = ["chatgpt", "claude", "gemini", "grok"]
//!
//! [[providers]]
//! key = "mistral"
//! name = "Le Chat"
//! home_url = "https://chat.mistral.ai/chat"
//!
//! [recovery]
//! max_retries = 2
//! retry_base_delay_ms = 1000
//!
//! [quick_prompt]
//! default_height = 72
//! min_height = 72
//! max_height = 360
//!
//! [runtime]
//! accept_language = "en-US,en"
//! zoom_factor = 1.0
//! strip_user_agent_tokens = ["Electron", "Chorus"]
//!
//! [window]
//! width = 1440
//! height = 900
//! sidebar_width = 64
//! ```

mod resolved;

pub use resolved::{
    BUILTIN_PROVIDERS, QuickPromptSettings, RecoverySettings, ResolvedConfig, RuntimePreferences,
    WindowSettings,
};

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

use chorus_types::ProviderKey;

#[derive(Debug, Default, Deserialize)]
pub struct ChorusConfig {
    pub panes: Option<PanesConfig>,
    /// Additional providers, or overrides of built-in ones by key.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    pub recovery: Option<RecoveryConfig>,
    pub quick_prompt: Option<QuickPromptConfig>,
    pub runtime: Option<RuntimeConfig>,
    pub window: Option<WindowConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PanesConfig {
    /// Visible pane count. Clamped to 1..=4.
    pub count: Option<usize>,
    /// Provider key per pane slot, in slot order.
    #[serde(default)]
    pub default_providers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub key: String,
    pub name: String,
    pub home_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecoveryConfig {
    /// Automatic reloads before the error page is shown. Default: 2.
    pub max_retries: Option<u32>,
    /// Linear backoff unit; retry N waits `N * retry_base_delay_ms`. Default: 1000.
    pub retry_base_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuickPromptConfig {
    pub default_height: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RuntimeConfig {
    pub accept_language: Option<String>,
    pub zoom_factor: Option<f64>,
    /// Product tokens removed from pane user agents.
    pub strip_user_agent_tokens: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sidebar_width: Option<u32>,
}

impl ChorusConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Persist the per-slot default providers to the config file.
    ///
    /// Uses `toml_edit` to preserve comments and formatting.
    /// Creates the config file and parent directory if they don't exist.
    pub fn persist_default_providers(providers: &[ProviderKey]) -> io::Result<()> {
        let path = config_path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine config path")
        })?;
        persist_default_providers_at(&path, providers)
    }
}

pub fn persist_default_providers_at(path: &Path, providers: &[ProviderKey]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // Ensure [panes] table exists
    if !doc.contains_key("panes") {
        doc["panes"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    let mut list = toml_edit::Array::new();
    for key in providers {
        list.push(key.as_str());
    }
    doc["panes"]["default_providers"] = toml_edit::value(list);

    // Write back via temp file + rename so a crash never leaves a torn config.
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(doc.to_string().as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chorus").join("config.toml"))
}
