//! Pane view construction, navigation and teardown.

use std::collections::{HashMap, HashSet};
use std::{fmt, iter};

use chorus_config::RuntimePreferences;
use chorus_host::{BrowserHost, HostError, ViewIsolation, ViewRole, ViewSpec};
use chorus_types::{PaneIndex, ViewId};
use chorus_utils::UserAgentSanitizer;

use crate::load_monitor::LoadMonitor;
use crate::panes::PaneViewState;
use crate::sidebar::SidebarBridge;

/// Argument prefix that tells pane preload code which slot it runs in.
pub const PANE_INDEX_ARGUMENT: &str = "--chorus-pane-index=";

/// Called when a navigation the application started could not be initiated.
pub type NavigationErrorHandler = Box<dyn FnMut(PaneIndex, ViewId, &HostError)>;

/// Maps views back to the pane that created them.
pub trait PaneResolver {
    fn pane_for_view(&self, view: ViewId) -> Option<PaneIndex>;
}

pub struct PaneViewService {
    preferences: RuntimePreferences,
    sanitizer: UserAgentSanitizer,
    views: HashMap<ViewId, PaneIndex>,
    on_navigation_error: Option<NavigationErrorHandler>,
}

impl fmt::Debug for PaneViewService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneViewService")
            .field("preferences", &self.preferences)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

impl PaneViewService {
    #[must_use]
    pub fn new(preferences: RuntimePreferences) -> Self {
        let sanitizer = UserAgentSanitizer::new(&preferences.strip_user_agent_tokens);
        Self {
            preferences,
            sanitizer,
            views: HashMap::new(),
            on_navigation_error: None,
        }
    }

    pub fn set_navigation_error_handler(&mut self, handler: NavigationErrorHandler) {
        self.on_navigation_error = Some(handler);
    }

    #[must_use]
    pub fn pane_view_spec(pane: PaneIndex) -> ViewSpec {
        ViewSpec {
            role: ViewRole::Pane(pane),
            isolation: ViewIsolation::STRICT,
            transparent: false,
            additional_arguments: vec![format!("{PANE_INDEX_ARGUMENT}{}", pane.value())],
        }
    }

    /// Create an isolated pane view with hooks and preferences in place, and
    /// put it under load supervision.
    pub fn create_pane_view(
        &mut self,
        host: &mut dyn BrowserHost,
        monitor: &mut LoadMonitor,
        pane: PaneIndex,
    ) -> Result<ViewId, HostError> {
        let view = host.create_view(&Self::pane_view_spec(pane))?;
        host.install_shortcut_hooks(view);
        host.install_context_menu(view);
        self.apply_pane_runtime_preferences(host, view);
        self.views.insert(view, pane);
        monitor.attach_pane(pane, view);
        tracing::debug!(%view, pane = pane.value(), "Created pane view");
        Ok(view)
    }

    /// User agent, accept-language and zoom. Safe to call repeatedly.
    pub fn apply_pane_runtime_preferences(&self, host: &mut dyn BrowserHost, view: ViewId) {
        if host.is_destroyed(view) {
            return;
        }
        if let Some(user_agent) = host.user_agent(view) {
            let cleaned = self.sanitizer.sanitize(&user_agent);
            if let Err(e) =
                host.set_user_agent(view, &cleaned, &self.preferences.accept_language)
            {
                tracing::debug!(%view, "Failed to set user agent: {e}");
            }
        }
        if let Err(e) = host.set_zoom_factor(view, self.preferences.zoom_factor) {
            tracing::debug!(%view, "Failed to set zoom factor: {e}");
        }
    }

    /// Pages may reset zoom on navigation; re-apply after every load.
    pub fn handle_finish_load(&self, host: &mut dyn BrowserHost, view: ViewId) {
        if self.views.contains_key(&view) {
            self.apply_pane_runtime_preferences(host, view);
        }
    }

    /// Navigate a pane view to `target_url`.
    ///
    /// The target is marked on the monitor first so that any failure arriving
    /// afterwards is attributed to it. Returns whether the navigation started.
    pub fn load_pane_url(
        &mut self,
        host: &mut dyn BrowserHost,
        monitor: &mut LoadMonitor,
        bridge: &mut SidebarBridge,
        pane: PaneIndex,
        view: ViewId,
        target_url: &str,
        track_loading: bool,
    ) -> bool {
        monitor.mark_target(view, target_url);
        if track_loading {
            bridge.begin_provider_loading_tracking(host, pane, view);
        }
        match host.load_url(view, target_url) {
            Ok(()) => true,
            Err(e) => {
                match self.on_navigation_error.as_mut() {
                    Some(handler) => handler(pane, view, &e),
                    None => tracing::warn!(
                        %view,
                        pane = pane.value(),
                        "Navigation to {target_url} could not start: {e}"
                    ),
                }
                false
            }
        }
    }

    /// Detach, untrack and close one view. Tolerates views that are already
    /// detached or destroyed.
    pub fn close_view(
        &mut self,
        host: &mut dyn BrowserHost,
        monitor: &mut LoadMonitor,
        bridge: &mut SidebarBridge,
        view: ViewId,
    ) {
        self.views.remove(&view);
        bridge.forget_view(view);
        monitor.clear(view);
        if host.is_destroyed(view) {
            return;
        }
        if let Err(e) = host.detach_view(view) {
            tracing::debug!(%view, "Detach during close: {e}");
        }
        if let Err(e) = host.close_view(view) {
            tracing::debug!(%view, "Close failed: {e}");
        }
    }

    /// Close every view a pane holds, each exactly once.
    pub fn close_pane(
        &mut self,
        host: &mut dyn BrowserHost,
        monitor: &mut LoadMonitor,
        bridge: &mut SidebarBridge,
        pane: &PaneViewState,
    ) {
        let mut seen = HashSet::new();
        let views = pane
            .cached_views
            .values()
            .map(|cached| cached.view)
            .chain(iter::once(pane.view));
        // Sorted so teardown order is stable across runs.
        let mut unique: Vec<ViewId> = views.filter(|view| seen.insert(*view)).collect();
        unique.sort();
        for view in unique {
            self.close_view(host, monitor, bridge, view);
        }
        tracing::info!(pane = pane.pane_index.value(), "Closed pane");
    }

    #[must_use]
    pub fn preferences(&self) -> &RuntimePreferences {
        &self.preferences
    }
}

impl PaneResolver for PaneViewService {
    fn pane_for_view(&self, view: ViewId) -> Option<PaneIndex> {
        self.views.get(&view).copied()
    }
}
