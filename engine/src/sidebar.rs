//! Notifications into the control surface (sidebar / composer).
//!
//! Delivery is fire-and-forget: each notification is rendered into a small
//! `CustomEvent` dispatch script and handed to the host. Dispatch failures
//! are logged, never returned.
//!
//! Per-pane loading indicators are guarded by tokens. Every
//! [`SidebarBridge::begin_provider_loading_tracking`] issues a fresh token for
//! the pane; a completion signal only turns the indicator off if its token is
//! still the current one, so an older load finishing late cannot hide the
//! indicator of a newer load.

use std::collections::HashMap;

use chorus_host::{BrowserHost, ViewEvent};
use chorus_types::{PaneIndex, ViewId};
use serde_json::json;

/// Event name for per-pane loading changes.
pub const PANE_LOADING_EVENT: &str = "chorus:pane-loading";

/// A notification the control surface understands.
///
/// Closed set: the surface only listens for these event names.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarNotification {
    PaneLoading { pane: PaneIndex, loading: bool },
    /// Any other event, with a JSON `detail` payload.
    Custom {
        event: String,
        detail: serde_json::Value,
    },
}

impl SidebarNotification {
    #[must_use]
    pub fn event_name(&self) -> &str {
        match self {
            Self::PaneLoading { .. } => PANE_LOADING_EVENT,
            Self::Custom { event, .. } => event,
        }
    }

    #[must_use]
    pub fn detail(&self) -> serde_json::Value {
        match self {
            Self::PaneLoading { pane, loading } => json!({
                "paneIndex": pane.value(),
                "loading": loading,
            }),
            Self::Custom { detail, .. } => detail.clone(),
        }
    }

    /// Render the notification as a dispatch script for the control surface.
    #[must_use]
    pub fn format(&self) -> String {
        let event = serde_json::to_string(self.event_name()).unwrap_or_else(|_| "\"\"".into());
        format!(
            "window.dispatchEvent(new CustomEvent({event}, {{ detail: {} }}));",
            self.detail()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCompletion {
    pane: PaneIndex,
    token: u64,
}

#[derive(Debug, Default)]
pub struct SidebarBridge {
    next_token: u64,
    tokens: HashMap<PaneIndex, u64>,
    /// Completion listeners per view, waiting for stop-loading or fail-load.
    listeners: HashMap<ViewId, Vec<PendingCompletion>>,
    /// Last loading state sent per pane.
    last_sent: HashMap<PaneIndex, bool>,
}

impl SidebarBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, host: &mut dyn BrowserHost, notification: &SidebarNotification) {
        if let SidebarNotification::PaneLoading { pane, loading } = notification {
            self.last_sent.insert(*pane, *loading);
        }
        if let Err(e) = host.execute_control_script(&notification.format()) {
            tracing::warn!(
                event = notification.event_name(),
                "Control surface notification failed: {e}"
            );
        }
    }

    /// Show the loading indicator for `pane` until `view` stops loading.
    pub fn begin_provider_loading_tracking(
        &mut self,
        host: &mut dyn BrowserHost,
        pane: PaneIndex,
        view: ViewId,
    ) {
        self.next_token += 1;
        let token = self.next_token;
        self.tokens.insert(pane, token);
        self.notify(host, &SidebarNotification::PaneLoading {
            pane,
            loading: true,
        });
        self.listeners
            .entry(view)
            .or_default()
            .push(PendingCompletion { pane, token });
    }

    /// Turn the indicator off now. Repeated clears notify once.
    pub fn clear_provider_loading_tracking(&mut self, host: &mut dyn BrowserHost, pane: PaneIndex) {
        let had_token = self.tokens.remove(&pane).is_some();
        if had_token || self.last_sent.get(&pane) != Some(&false) {
            self.notify(host, &SidebarNotification::PaneLoading {
                pane,
                loading: false,
            });
        }
    }

    #[must_use]
    pub fn is_tracking(&self, pane: PaneIndex) -> bool {
        self.tokens.contains_key(&pane)
    }

    /// Feed a host event for `view`. Stop-loading and fail-load signals complete
    /// the view's pending tracking once its main frame is idle.
    pub fn handle_view_event(&mut self, host: &mut dyn BrowserHost, view: ViewId, event: &ViewEvent) {
        if !matches!(
            event,
            ViewEvent::DidStopLoading | ViewEvent::DidFailLoad { .. }
        ) {
            return;
        }
        if !self.listeners.contains_key(&view) {
            return;
        }
        // A retry or error page may already be loading; stay armed for its stop signal.
        if host.is_loading_main_frame(view) {
            return;
        }
        let Some(pending) = self.listeners.remove(&view) else {
            return;
        };
        for completion in pending {
            if self.tokens.get(&completion.pane) != Some(&completion.token) {
                tracing::debug!(
                    pane = completion.pane.value(),
                    "Dropping stale loading completion"
                );
                continue;
            }
            self.tokens.remove(&completion.pane);
            self.notify(host, &SidebarNotification::PaneLoading {
                pane: completion.pane,
                loading: false,
            });
        }
    }

    /// Drop listeners for a view that is being closed.
    pub fn forget_view(&mut self, view: ViewId) {
        self.listeners.remove(&view);
    }
}
