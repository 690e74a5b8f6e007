//! Resolved, invariant-safe configuration.
//!
//! Converts the optional, boundary-level [`ChorusConfig`] into concrete values
//! the engine can use without further checks. Invalid entries are logged and
//! replaced by defaults; resolution itself never fails.

use std::mem;
use std::time::Duration;

use chorus_types::{PaneCount, ProviderCatalog, ProviderEntry, ProviderKey};

use crate::ChorusConfig;

/// Built-in providers as `(key, display name, home URL)`.
pub const BUILTIN_PROVIDERS: &[(&str, &str, &str)] = &[
    ("chatgpt", "ChatGPT", "https://chatgpt.com/"),
    ("claude", "Claude", "https://claude.ai/new"),
    ("gemini", "Gemini", "https://gemini.google.com/app"),
    ("grok", "Grok", "https://grok.com/"),
    ("perplexity", "Perplexity", "https://www.perplexity.ai/"),
];

/// Provider per pane slot when nothing is configured.
const DEFAULT_SLOT_PROVIDERS: [&str; PaneCount::MAX] = ["chatgpt", "claude", "gemini", "grok"];

const DEFAULT_PANE_COUNT: usize = 3;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

const DEFAULT_QUICK_PROMPT_HEIGHT: f64 = 72.0;
const DEFAULT_QUICK_PROMPT_MIN_HEIGHT: f64 = 72.0;
const DEFAULT_QUICK_PROMPT_MAX_HEIGHT: f64 = 360.0;

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en";
const DEFAULT_ZOOM_FACTOR: f64 = 1.0;
const MIN_ZOOM_FACTOR: f64 = 0.25;
const MAX_ZOOM_FACTOR: f64 = 5.0;
const DEFAULT_STRIPPED_UA_TOKENS: &[&str] = &["Electron", "Chorus"];

const DEFAULT_WINDOW_WIDTH: u32 = 1440;
const DEFAULT_WINDOW_HEIGHT: u32 = 900;
const DEFAULT_SIDEBAR_WIDTH: u32 = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub pane_count: PaneCount,
    /// One known provider per pane slot; always `PaneCount::MAX` entries.
    pub default_providers: Vec<ProviderKey>,
    pub catalog: ProviderCatalog,
    pub recovery: RecoverySettings,
    pub quick_prompt: QuickPromptSettings,
    pub runtime: RuntimePreferences,
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverySettings {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

/// Overlay heights, guaranteed `min_height <= default_height <= max_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickPromptSettings {
    pub default_height: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for QuickPromptSettings {
    fn default() -> Self {
        Self {
            default_height: DEFAULT_QUICK_PROMPT_HEIGHT,
            min_height: DEFAULT_QUICK_PROMPT_MIN_HEIGHT,
            max_height: DEFAULT_QUICK_PROMPT_MAX_HEIGHT,
        }
    }
}

impl QuickPromptSettings {
    #[must_use]
    pub fn clamp_height(&self, height: f64) -> f64 {
        height.clamp(self.min_height, self.max_height)
    }
}

/// Per-view browser preferences applied to every pane.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimePreferences {
    pub accept_language: String,
    pub zoom_factor: f64,
    pub strip_user_agent_tokens: Vec<String>,
}

impl Default for RuntimePreferences {
    fn default() -> Self {
        Self {
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            strip_user_agent_tokens: DEFAULT_STRIPPED_UA_TOKENS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub sidebar_width: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::from_config(&ChorusConfig::default())
    }
}

impl ChorusConfig {
    #[must_use]
    pub fn resolve(&self) -> ResolvedConfig {
        ResolvedConfig::from_config(self)
    }
}

impl ResolvedConfig {
    #[must_use]
    pub fn from_config(config: &ChorusConfig) -> Self {
        let catalog = resolve_catalog(config);
        let panes = config.panes.as_ref();

        let pane_count = PaneCount::clamped(
            panes
                .and_then(|p| p.count)
                .unwrap_or(DEFAULT_PANE_COUNT),
        );

        let configured: &[String] = panes.map_or(&[], |p| p.default_providers.as_slice());
        let default_providers = resolve_default_providers(configured, &catalog);

        Self {
            pane_count,
            default_providers,
            catalog,
            recovery: resolve_recovery(config),
            quick_prompt: resolve_quick_prompt(config),
            runtime: resolve_runtime(config),
            window: resolve_window(config),
        }
    }

    /// Default provider for a pane slot.
    #[must_use]
    pub fn default_provider(&self, slot: usize) -> Option<&ProviderKey> {
        self.default_providers.get(slot)
    }
}

fn resolve_catalog(config: &ChorusConfig) -> ProviderCatalog {
    let mut catalog = ProviderCatalog::default();
    for (key, name, home_url) in BUILTIN_PROVIDERS {
        if let Ok(key) = ProviderKey::new(key) {
            catalog.insert(ProviderEntry::new(key, *name, *home_url));
        }
    }

    for provider in &config.providers {
        let key = match ProviderKey::new(&provider.key) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Ignoring provider entry {:?}: {e}", provider.name);
                continue;
            }
        };
        let home_url = provider.home_url.trim();
        if home_url.is_empty() {
            tracing::warn!("Ignoring provider {key}: empty home_url");
            continue;
        }
        let name = if provider.name.trim().is_empty() {
            key.as_str().to_string()
        } else {
            provider.name.trim().to_string()
        };
        catalog.insert(ProviderEntry::new(key, name, home_url));
    }

    catalog
}

fn resolve_default_providers(configured: &[String], catalog: &ProviderCatalog) -> Vec<ProviderKey> {
    (0..PaneCount::MAX)
        .map(|slot| {
            let from_config = configured
                .get(slot)
                .and_then(|raw| ProviderKey::new(raw).ok())
                .filter(|key| {
                    let known = catalog.contains(key.as_str());
                    if !known {
                        tracing::warn!("Unknown default provider {key} for pane {slot}");
                    }
                    known
                });
            from_config.unwrap_or_else(|| builtin_slot_provider(slot, catalog))
        })
        .collect()
}

fn builtin_slot_provider(slot: usize, catalog: &ProviderCatalog) -> ProviderKey {
    let preferred = DEFAULT_SLOT_PROVIDERS[slot % DEFAULT_SLOT_PROVIDERS.len()];
    match catalog.get(preferred) {
        Some(entry) => entry.key.clone(),
        None => catalog.entries()[0].key.clone(),
    }
}

fn resolve_recovery(config: &ChorusConfig) -> RecoverySettings {
    let recovery = config.recovery.as_ref();
    let max_retries = recovery
        .and_then(|r| r.max_retries)
        .unwrap_or(DEFAULT_MAX_RETRIES);
    let delay_ms = recovery
        .and_then(|r| r.retry_base_delay_ms)
        .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS);
    RecoverySettings {
        max_retries,
        retry_base_delay: Duration::from_millis(delay_ms),
    }
}

fn positive_finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn resolve_quick_prompt(config: &ChorusConfig) -> QuickPromptSettings {
    let quick_prompt = config.quick_prompt.as_ref();
    let mut min_height = positive_finite(quick_prompt.and_then(|q| q.min_height))
        .unwrap_or(DEFAULT_QUICK_PROMPT_MIN_HEIGHT);
    let mut max_height = positive_finite(quick_prompt.and_then(|q| q.max_height))
        .unwrap_or(DEFAULT_QUICK_PROMPT_MAX_HEIGHT);
    if min_height > max_height {
        tracing::warn!("quick_prompt.min_height exceeds max_height; swapping");
        mem::swap(&mut min_height, &mut max_height);
    }
    let default_height = positive_finite(quick_prompt.and_then(|q| q.default_height))
        .unwrap_or(DEFAULT_QUICK_PROMPT_HEIGHT)
        .clamp(min_height, max_height);

    QuickPromptSettings {
        default_height,
        min_height,
        max_height,
    }
}

fn resolve_runtime(config: &ChorusConfig) -> RuntimePreferences {
    let runtime = config.runtime.as_ref();
    let defaults = RuntimePreferences::default();

    let accept_language = runtime
        .and_then(|r| r.accept_language.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or(defaults.accept_language, ToString::to_string);
    let zoom_factor = positive_finite(runtime.and_then(|r| r.zoom_factor))
        .map_or(defaults.zoom_factor, |z| z.clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR));
    let strip_user_agent_tokens = runtime
        .and_then(|r| r.strip_user_agent_tokens.clone())
        .unwrap_or(defaults.strip_user_agent_tokens);

    RuntimePreferences {
        accept_language,
        zoom_factor,
        strip_user_agent_tokens,
    }
}

fn resolve_window(config: &ChorusConfig) -> WindowSettings {
    let window = config.window.as_ref();
    let defaults = WindowSettings::default();
    WindowSettings {
        width: window
            .and_then(|w| w.width)
            .filter(|w| *w > 0)
            .unwrap_or(defaults.width),
        height: window
            .and_then(|w| w.height)
            .filter(|h| *h > 0)
            .unwrap_or(defaults.height),
        sidebar_width: window
            .and_then(|w| w.sidebar_width)
            .unwrap_or(defaults.sidebar_width),
    }
}
