//! Where the per-slot provider choice is remembered between runs.

use std::io;
use std::path::{Path, PathBuf};

use chorus_config::persist_default_providers_at;
use chorus_types::ProviderKey;

/// Sink for the per-slot default providers.
pub trait ProviderPreferenceStore {
    fn persist_default_providers(&mut self, providers: &[ProviderKey]) -> io::Result<()>;
}

/// Writes `[panes].default_providers` into a TOML config file, preserving
/// everything else in it.
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    path: PathBuf,
}

impl ConfigFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `~/.chorus/config.toml`, if a home directory exists.
    #[must_use]
    pub fn user_config() -> Option<Self> {
        chorus_config::config_path().map(Self::new)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProviderPreferenceStore for ConfigFileStore {
    fn persist_default_providers(&mut self, providers: &[ProviderKey]) -> io::Result<()> {
        persist_default_providers_at(&self.path, providers)?;
        tracing::debug!(path = %self.path.display(), "Persisted default providers");
        Ok(())
    }
}
