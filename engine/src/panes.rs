//! Pane lifecycle: resizing the pane set, switching providers, resetting.
//!
//! The orchestrator exclusively owns every pane slot and every view cached in
//! it. It is the only mutator of the pane list; all mutators take `&mut self`,
//! so they cannot interleave.
//!
//! Each slot keeps one view per provider it has visited. Switching back to a
//! provider whose cached view is still on its home page reuses that view
//! without a reload. A cached view that navigated away is stale and is
//! replaced by a fresh one.

use std::collections::HashMap;

use chorus_host::{BrowserHost, HostError};
use chorus_types::{PaneCount, PaneIndex, ProviderCatalog, ProviderEntry, ProviderKey, ViewId};
use chorus_utils::urls_equivalent;
use thiserror::Error;

use crate::layout::BoundsResolver;
use crate::load_monitor::{LoadMonitor, RecoveryContext};
use crate::pane_view::PaneViewService;
use crate::quick_prompt::AnchorTracker;
use crate::sidebar::SidebarBridge;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedView {
    pub view: ViewId,
    /// Last known URL of the view.
    pub url: String,
}

/// One logical pane slot.
///
/// `cached_views[provider_key].view == view` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneViewState {
    pub pane_index: PaneIndex,
    pub provider_key: ProviderKey,
    pub view: ViewId,
    pub url: String,
    pub cached_views: HashMap<ProviderKey, CachedView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneCountOutcome {
    pub current_pane_count: usize,
    pub quick_prompt_anchor_pane_index: PaneIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSwitchOutcome {
    pub success: bool,
    pub pane_index: usize,
}

#[derive(Debug, Error)]
pub enum PaneError {
    #[error("pane {0} does not exist")]
    UnknownPane(usize),
    #[error("unknown provider {0:?}")]
    UnknownProvider(String),
    #[error("no default provider for pane {0}")]
    MissingDefaultProvider(usize),
    #[error("failed to create view for pane {pane}: {source}")]
    CreateView {
        pane: usize,
        #[source]
        source: HostError,
    },
}

/// Collaborators a pane mutation touches.
pub struct PaneContext<'a> {
    pub host: &'a mut dyn BrowserHost,
    pub monitor: &'a mut LoadMonitor,
    pub bridge: &'a mut SidebarBridge,
    pub views: &'a mut PaneViewService,
    pub anchor: &'a mut AnchorTracker,
    pub catalog: &'a ProviderCatalog,
    pub bounds: &'a dyn BoundsResolver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitchKind {
    Reused,
    Created,
}

#[derive(Debug, Default)]
pub struct PaneOrchestrator {
    panes: Vec<PaneViewState>,
    default_providers: Vec<ProviderKey>,
}

impl PaneOrchestrator {
    #[must_use]
    pub fn new(default_providers: Vec<ProviderKey>) -> Self {
        Self {
            panes: Vec::new(),
            default_providers,
        }
    }

    #[must_use]
    pub fn panes(&self) -> &[PaneViewState] {
        &self.panes
    }

    #[must_use]
    pub fn pane(&self, index: usize) -> Option<&PaneViewState> {
        self.panes.get(index)
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Provider per slot, updated whenever the user picks a provider.
    #[must_use]
    pub fn default_providers(&self) -> &[ProviderKey] {
        &self.default_providers
    }

    /// Find the pane and provider a (possibly cached) view belongs to.
    #[must_use]
    pub fn locate_view(&self, view: ViewId) -> Option<(&PaneViewState, &ProviderKey)> {
        self.panes.iter().find_map(|pane| {
            pane.cached_views
                .iter()
                .find(|(_, cached)| cached.view == view)
                .map(|(key, _)| (pane, key))
        })
    }

    #[must_use]
    pub fn contains_view(&self, view: ViewId) -> bool {
        self.locate_view(view).is_some()
    }

    /// Grow or shrink the pane set.
    ///
    /// New panes load their slot's default provider silently. Removed panes
    /// go highest index first. The quick prompt anchor is clamped to the new
    /// last pane.
    pub fn set_pane_count(
        &mut self,
        ctx: &mut PaneContext<'_>,
        count: PaneCount,
        default_providers: &[ProviderKey],
    ) -> PaneCountOutcome {
        let target = count.get();

        while self.panes.len() < target {
            let index = self.panes.len();
            if let Err(e) = self.append_pane(ctx, index, default_providers) {
                tracing::warn!("Stopped growing panes at {index}: {e}");
                break;
            }
        }

        while self.panes.len() > target {
            let Some(pane) = self.panes.pop() else {
                break;
            };
            ctx.bridge
                .clear_provider_loading_tracking(ctx.host, pane.pane_index);
            ctx.views
                .close_pane(ctx.host, ctx.monitor, ctx.bridge, &pane);
        }

        let last = self.panes.len().saturating_sub(1);
        ctx.anchor.clamp_to_last(PaneIndex::new(last));
        self.apply_bounds(ctx);

        tracing::info!(panes = self.panes.len(), "Pane count set");
        PaneCountOutcome {
            current_pane_count: self.panes.len(),
            quick_prompt_anchor_pane_index: ctx.anchor.anchor(),
        }
    }

    fn append_pane(
        &mut self,
        ctx: &mut PaneContext<'_>,
        index: usize,
        default_providers: &[ProviderKey],
    ) -> Result<(), PaneError> {
        let provider_key = default_providers
            .get(index)
            .ok_or(PaneError::MissingDefaultProvider(index))?;
        let entry = ctx
            .catalog
            .get(provider_key.as_str())
            .ok_or_else(|| PaneError::UnknownProvider(provider_key.to_string()))?;

        let pane_index = PaneIndex::new(index);
        let view = ctx
            .views
            .create_pane_view(ctx.host, ctx.monitor, pane_index)
            .map_err(|source| PaneError::CreateView {
                pane: index,
                source,
            })?;
        attach(ctx.host, view);
        ctx.views.load_pane_url(
            ctx.host,
            ctx.monitor,
            ctx.bridge,
            pane_index,
            view,
            &entry.home_url,
            false,
        );

        let mut cached_views = HashMap::new();
        cached_views.insert(
            entry.key.clone(),
            CachedView {
                view,
                url: entry.home_url.clone(),
            },
        );
        self.panes.push(PaneViewState {
            pane_index,
            provider_key: entry.key.clone(),
            view,
            url: entry.home_url.clone(),
            cached_views,
        });
        Ok(())
    }

    /// Switch `pane_index` to `provider_key`, reusing a cached home view when
    /// possible. Invalid input fails without side effects.
    pub fn update_pane_provider_with_lifecycle(
        &mut self,
        ctx: &mut PaneContext<'_>,
        pane_index: usize,
        provider_key: &str,
    ) -> ProviderSwitchOutcome {
        let failure = ProviderSwitchOutcome {
            success: false,
            pane_index,
        };
        if pane_index >= self.panes.len() {
            tracing::debug!("Provider switch rejected: {}", PaneError::UnknownPane(pane_index));
            return failure;
        }
        let catalog = ctx.catalog;
        let Some(entry) = ProviderKey::new(provider_key)
            .ok()
            .and_then(|key| catalog.get(key.as_str()))
        else {
            tracing::debug!(
                "Provider switch rejected: {}",
                PaneError::UnknownProvider(provider_key.to_string())
            );
            return failure;
        };

        match self.switch_to_provider_home(ctx, pane_index, entry) {
            Ok(kind) => {
                tracing::info!(
                    pane = pane_index,
                    provider = %entry.key,
                    reused = kind == SwitchKind::Reused,
                    "Switched pane provider"
                );
                ProviderSwitchOutcome {
                    success: true,
                    pane_index,
                }
            }
            Err(e) => {
                tracing::warn!("Provider switch failed: {e}");
                failure
            }
        }
    }

    /// Send every pane back to its provider's home page.
    ///
    /// Returns `false` if any pane holds a provider the catalog no longer
    /// knows; the remaining panes are still reset.
    pub fn reset_all_panes_to_provider_home_with_lifecycle(
        &mut self,
        ctx: &mut PaneContext<'_>,
    ) -> bool {
        let catalog = ctx.catalog;
        let mut all_known = true;
        for index in 0..self.panes.len() {
            let pane_index = self.panes[index].pane_index;
            let provider_key = self.panes[index].provider_key.clone();
            let Some(entry) = catalog.get(provider_key.as_str()) else {
                tracing::warn!(pane = index, provider = %provider_key, "Reset skipped: unknown provider");
                ctx.bridge
                    .clear_provider_loading_tracking(ctx.host, pane_index);
                all_known = false;
                continue;
            };
            if let Err(e) = self.switch_to_provider_home(ctx, index, entry) {
                tracing::warn!(pane = index, "Reset failed: {e}");
            }
        }
        all_known
    }

    fn switch_to_provider_home(
        &mut self,
        ctx: &mut PaneContext<'_>,
        index: usize,
        entry: &ProviderEntry,
    ) -> Result<SwitchKind, PaneError> {
        let pane = self
            .panes
            .get(index)
            .ok_or(PaneError::UnknownPane(index))?;
        let pane_index = pane.pane_index;
        let old_view = pane.view;

        let reusable = pane.cached_views.get(&entry.key).filter(|cached| {
            urls_equivalent(&cached.url, &entry.home_url) && !ctx.host.is_destroyed(cached.view)
        });

        if let Some(cached) = reusable.cloned() {
            detach(ctx.host, old_view);
            attach(ctx.host, cached.view);
            if let Err(e) = ctx.host.set_bounds(cached.view, ctx.bounds.pane_bounds(pane_index)) {
                tracing::debug!(view = %cached.view, "Failed to position pane: {e}");
            }
            ctx.bridge
                .clear_provider_loading_tracking(ctx.host, pane_index);
            ctx.anchor.set_anchor(pane_index);

            let pane = &mut self.panes[index];
            pane.provider_key = entry.key.clone();
            pane.view = cached.view;
            pane.url = cached.url;
            self.remember_default_provider(index, &entry.key);
            return Ok(SwitchKind::Reused);
        }

        let view = ctx
            .views
            .create_pane_view(ctx.host, ctx.monitor, pane_index)
            .map_err(|source| PaneError::CreateView {
                pane: index,
                source,
            })?;
        detach(ctx.host, old_view);
        attach(ctx.host, view);
        if let Err(e) = ctx.host.set_bounds(view, ctx.bounds.pane_bounds(pane_index)) {
            tracing::debug!(%view, "Failed to position pane: {e}");
        }

        let stale = self.panes[index]
            .cached_views
            .insert(
                entry.key.clone(),
                CachedView {
                    view,
                    url: entry.home_url.clone(),
                },
            )
            .map(|cached| cached.view);
        if let Some(stale) = stale {
            tracing::debug!(view = %stale, provider = %entry.key, "Closing stale cached view");
            ctx.views
                .close_view(ctx.host, ctx.monitor, ctx.bridge, stale);
        }

        ctx.views.load_pane_url(
            ctx.host,
            ctx.monitor,
            ctx.bridge,
            pane_index,
            view,
            &entry.home_url,
            true,
        );

        let pane = &mut self.panes[index];
        pane.provider_key = entry.key.clone();
        pane.view = view;
        pane.url = entry.home_url.clone();
        self.remember_default_provider(index, &entry.key);
        Ok(SwitchKind::Created)
    }

    fn remember_default_provider(&mut self, index: usize, key: &ProviderKey) {
        if let Some(slot) = self.default_providers.get_mut(index) {
            *slot = key.clone();
        } else if index == self.default_providers.len() {
            self.default_providers.push(key.clone());
        }
    }

    /// Refresh the cached URL of a view after it finished a navigation.
    pub fn handle_finish_load(&mut self, host: &dyn BrowserHost, view: ViewId) {
        let Some(url) = host.current_url(view) else {
            return;
        };
        for pane in &mut self.panes {
            let Some(cached) = pane.cached_views.values_mut().find(|c| c.view == view) else {
                continue;
            };
            cached.url.clone_from(&url);
            if pane.view == view {
                pane.url = url;
            }
            return;
        }
    }

    /// Re-apply pane bounds, e.g. after the window resized.
    pub fn apply_bounds(&self, ctx: &mut PaneContext<'_>) {
        for pane in &self.panes {
            if let Err(e) = ctx
                .host
                .set_bounds(pane.view, ctx.bounds.pane_bounds(pane.pane_index))
            {
                tracing::debug!(view = %pane.view, "Failed to position pane: {e}");
            }
        }
    }

    /// Close every pane, highest index first.
    pub fn close_all(&mut self, ctx: &mut PaneContext<'_>) {
        while let Some(pane) = self.panes.pop() {
            ctx.bridge
                .clear_provider_loading_tracking(ctx.host, pane.pane_index);
            ctx.views
                .close_pane(ctx.host, ctx.monitor, ctx.bridge, &pane);
        }
    }

    /// Lookup adapter for the load monitor.
    #[must_use]
    pub fn recovery_lookup<'a>(&'a self, catalog: &'a ProviderCatalog) -> PaneRecoveryLookup<'a> {
        PaneRecoveryLookup {
            panes: self,
            catalog,
        }
    }
}

fn attach(host: &mut dyn BrowserHost, view: ViewId) {
    if let Err(e) = host.attach_view(view) {
        tracing::warn!(%view, "Failed to attach pane view: {e}");
    }
}

fn detach(host: &mut dyn BrowserHost, view: ViewId) {
    if let Err(e) = host.detach_view(view) {
        tracing::debug!(%view, "Detach ignored: {e}");
    }
}

/// Resolves provider names and fallback targets from the pane set.
pub struct PaneRecoveryLookup<'a> {
    panes: &'a PaneOrchestrator,
    catalog: &'a ProviderCatalog,
}

impl RecoveryContext for PaneRecoveryLookup<'_> {
    fn provider_name(&self, pane: PaneIndex, view: ViewId) -> String {
        let key = self
            .panes
            .locate_view(view)
            .map(|(_, key)| key.clone())
            .or_else(|| {
                self.panes
                    .pane(pane.value())
                    .map(|state| state.provider_key.clone())
            });
        match key {
            Some(key) => self
                .catalog
                .get(key.as_str())
                .map_or_else(|| key.to_string(), |entry| entry.display_name.clone()),
            None => "Provider".to_string(),
        }
    }

    fn fallback_target_url(&self, pane: PaneIndex, view: ViewId) -> Option<String> {
        if let Some((_, key)) = self.panes.locate_view(view)
            && let Some(entry) = self.catalog.get(key.as_str())
        {
            return Some(entry.home_url.clone());
        }
        self.panes.pane(pane.value()).map(|state| state.url.clone())
    }
}
