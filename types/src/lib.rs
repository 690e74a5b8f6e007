//! Core domain types for Chorus.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
pub use ids::{PaneIndex, ViewId};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Provider Types
// ============================================================================

/// Stable identifier of a hosted chat provider (e.g. `"chatgpt"`, `"claude"`).
///
/// Keys are trimmed, lowercase and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderKey(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("provider key must not be empty")]
pub struct ProviderKeyError;

impl ProviderKey {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProviderKeyError> {
        let normalized = value.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            Err(ProviderKeyError)
        } else {
            Ok(Self(normalized))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderKey {
    type Error = ProviderKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProviderKey {
    type Error = ProviderKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderKey> for String {
    fn from(value: ProviderKey) -> Self {
        value.0
    }
}

impl Borrow<str> for ProviderKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provider as the pane core sees it: a display name and a canonical home URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub key: ProviderKey,
    pub display_name: String,
    pub home_url: String,
}

impl ProviderEntry {
    #[must_use]
    pub fn new(key: ProviderKey, display_name: impl Into<String>, home_url: impl Into<String>) -> Self {
        Self {
            key,
            display_name: display_name.into(),
            home_url: home_url.into(),
        }
    }
}

/// Ordered lookup table of known providers.
///
/// Later insertions with an existing key replace the earlier entry in place,
/// so user configuration can override a built-in provider's name or URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCatalog {
    entries: Vec<ProviderEntry>,
}

impl ProviderCatalog {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = ProviderEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    pub fn insert(&mut self, entry: ProviderEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProviderEntry> {
        self.entries.iter().find(|e| e.key.as_str() == key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Pane Count
// ============================================================================

/// Number of visible pane slots, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PaneCount(usize);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("pane count must be between {min} and {max}, got {value}", min = PaneCount::MIN, max = PaneCount::MAX)]
pub struct PaneCountError {
    pub value: usize,
}

impl PaneCount {
    pub const MIN: usize = 1;
    pub const MAX: usize = 4;

    pub fn new(value: usize) -> Result<Self, PaneCountError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PaneCountError { value })
        }
    }

    /// Clamp an arbitrary value into range.
    #[must_use]
    pub fn clamped(value: usize) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Index of the last pane in a layout of this size.
    #[must_use]
    pub const fn last_index(self) -> PaneIndex {
        PaneIndex::new(self.0 - 1)
    }
}

impl TryFrom<usize> for PaneCount {
    type Error = PaneCountError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PaneCount> for usize {
    fn from(value: PaneCount) -> Self {
        value.0
    }
}

impl fmt::Display for PaneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Integer rectangle in window coordinates (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
