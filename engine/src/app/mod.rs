//! The engine facade.
//!
//! [`App`] owns every piece of pane and overlay state plus the host, and is
//! the only thing the outer shell talks to: user commands come in as method
//! calls, browser signals come in through [`App::handle_host_event`], and
//! deferred work runs from [`App::run_due_timers`].

use std::time::Instant;

use chorus_config::ResolvedConfig;
use chorus_host::BrowserHost;
use chorus_types::{PaneCount, PaneIndex, ProviderKey, ViewId};

use crate::layout::SplitLayout;
use crate::load_monitor::LoadMonitor;
use crate::pane_view::{NavigationErrorHandler, PaneViewService};
use crate::panes::{PaneContext, PaneCountOutcome, PaneOrchestrator, ProviderSwitchOutcome};
use crate::persistence::ProviderPreferenceStore;
use crate::quick_prompt::{AnchorTracker, HideOptions, QuickPromptContext, QuickPromptController};
use crate::recovery::PaneRecoveryState;
use crate::sidebar::{SidebarBridge, SidebarNotification};
use crate::timers::{Clock, TimerQueue};

/// Borrow the pane-mutation context out of an `App` without borrowing the
/// orchestrator itself.
macro_rules! pane_context {
    ($app:ident) => {
        PaneContext {
            host: &mut $app.host,
            monitor: &mut $app.monitor,
            bridge: &mut $app.bridge,
            views: &mut $app.views,
            anchor: &mut $app.anchor,
            catalog: &$app.config.catalog,
            bounds: &$app.layout,
        }
    };
}

/// Same for the overlay controller.
macro_rules! quick_prompt_context {
    ($app:ident) => {
        QuickPromptContext {
            host: &mut $app.host,
            anchor: &mut $app.anchor,
            resolver: &$app.views,
            bounds: &$app.layout,
            timers: &mut $app.timers,
            now: $app.clock.now(),
        }
    };
}

mod events;
#[cfg(test)]
mod tests;

pub struct App<H: BrowserHost> {
    host: H,
    config: ResolvedConfig,
    clock: Box<dyn Clock>,
    timers: TimerQueue,
    monitor: LoadMonitor,
    bridge: SidebarBridge,
    views: PaneViewService,
    panes: PaneOrchestrator,
    anchor: AnchorTracker,
    quick_prompt: QuickPromptController,
    layout: SplitLayout,
    store: Option<Box<dyn ProviderPreferenceStore>>,
}

impl<H: BrowserHost> App<H> {
    pub fn new(host: H, config: ResolvedConfig, clock: Box<dyn Clock>) -> Self {
        let layout = SplitLayout::new(config.window, config.pane_count);
        Self {
            host,
            clock,
            timers: TimerQueue::new(),
            monitor: LoadMonitor::new(config.recovery),
            bridge: SidebarBridge::new(),
            views: PaneViewService::new(config.runtime.clone()),
            panes: PaneOrchestrator::new(config.default_providers.clone()),
            anchor: AnchorTracker::new(),
            quick_prompt: QuickPromptController::new(config.quick_prompt),
            layout,
            store: None,
            config,
        }
    }

    #[must_use]
    pub fn with_preference_store(mut self, store: Box<dyn ProviderPreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn set_navigation_error_handler(&mut self, handler: NavigationErrorHandler) {
        self.views.set_navigation_error_handler(handler);
    }

    /// Populate the configured number of panes.
    pub fn initialize(&mut self) -> PaneCountOutcome {
        let count = self.config.pane_count;
        let outcome = self.set_pane_count(count);
        tracing::info!(panes = outcome.current_pane_count, "Chorus engine initialized");
        outcome
    }

    pub fn set_pane_count(&mut self, count: PaneCount) -> PaneCountOutcome {
        self.layout.set_pane_count(count);
        let defaults = self.panes.default_providers().to_vec();
        let outcome = self
            .panes
            .set_pane_count(&mut pane_context!(self), count, &defaults);

        // Growth can stop early if a view could not be created.
        if outcome.current_pane_count != count.get() && outcome.current_pane_count > 0 {
            self.layout
                .set_pane_count(PaneCount::clamped(outcome.current_pane_count));
            self.panes.apply_bounds(&mut pane_context!(self));
        }
        self.quick_prompt.restack(&mut self.host);
        self.quick_prompt.relayout(&mut quick_prompt_context!(self));
        outcome
    }

    /// Switch a pane's provider and remember the choice for its slot.
    pub fn update_pane_provider(&mut self, pane_index: usize, provider_key: &str) -> ProviderSwitchOutcome {
        let outcome =
            self.panes
                .update_pane_provider_with_lifecycle(&mut pane_context!(self), pane_index, provider_key);
        if outcome.success {
            self.quick_prompt.restack(&mut self.host);
            self.persist_default_providers();
        }
        outcome
    }

    pub fn reset_all_panes_to_provider_home(&mut self) -> bool {
        let success = self
            .panes
            .reset_all_panes_to_provider_home_with_lifecycle(&mut pane_context!(self));
        self.quick_prompt.restack(&mut self.host);
        success
    }

    fn persist_default_providers(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = store.persist_default_providers(self.panes.default_providers()) {
            tracing::warn!("Failed to persist default providers: {e}");
        }
    }

    pub fn toggle_quick_prompt(&mut self) -> bool {
        self.quick_prompt.toggle(&mut quick_prompt_context!(self))
    }

    pub fn show_quick_prompt(&mut self) -> bool {
        self.quick_prompt.show(&mut quick_prompt_context!(self))
    }

    pub fn hide_quick_prompt(&mut self, options: HideOptions) -> bool {
        self.quick_prompt
            .hide(&mut quick_prompt_context!(self), options)
    }

    /// Returns the overlay's visibility and stored height.
    pub fn resize_quick_prompt(&mut self, height: f64) -> (bool, f64) {
        self.quick_prompt
            .resize(&mut quick_prompt_context!(self), height)
    }

    /// Explicit anchor from the control surface. Invalid indices are ignored.
    pub fn set_quick_prompt_anchor(&mut self, pane_index: f64) -> bool {
        if !self.anchor.set_anchor_pane_index(pane_index) {
            return false;
        }
        let last = self.panes.pane_count().saturating_sub(1);
        self.anchor.clamp_to_last(PaneIndex::new(last));
        self.quick_prompt.relayout(&mut quick_prompt_context!(self));
        true
    }

    /// The host window changed size.
    pub fn relayout(&mut self, width: u32, height: u32) {
        self.layout.set_window_size(width, height);
        self.panes.apply_bounds(&mut pane_context!(self));
        self.quick_prompt.relayout(&mut quick_prompt_context!(self));
    }

    /// Forward an arbitrary event to the control surface.
    pub fn notify_control_surface(&mut self, event: impl Into<String>, detail: serde_json::Value) {
        self.bridge.notify(
            &mut self.host,
            &SidebarNotification::Custom {
                event: event.into(),
                detail,
            },
        );
    }

    /// Close the overlay and every pane view.
    pub fn shutdown(&mut self) {
        self.quick_prompt.destroy(&mut quick_prompt_context!(self));
        self.panes.close_all(&mut pane_context!(self));
        self.monitor.clear_all();
        tracing::info!("Chorus engine shut down");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    #[must_use]
    pub fn panes(&self) -> &PaneOrchestrator {
        &self.panes
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.panes.pane_count()
    }

    #[must_use]
    pub fn default_providers(&self) -> &[ProviderKey] {
        self.panes.default_providers()
    }

    #[must_use]
    pub fn quick_prompt(&self) -> &QuickPromptController {
        &self.quick_prompt
    }

    #[must_use]
    pub fn quick_prompt_anchor(&self) -> PaneIndex {
        self.anchor.anchor()
    }

    #[must_use]
    pub fn recovery_state(&self, view: ViewId) -> Option<&PaneRecoveryState> {
        self.monitor.state(view)
    }

    #[must_use]
    pub fn is_pane_loading(&self, pane: PaneIndex) -> bool {
        self.bridge.is_tracking(pane)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
