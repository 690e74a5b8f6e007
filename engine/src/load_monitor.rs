//! Per-view load supervision.
//!
//! The monitor tracks, for every pane view, the URL it is supposed to be
//! showing and how many times loading it has failed. Failures are run through
//! [`decide_pane_load_recovery`]; retries are queued on the [`TimerQueue`] with
//! linear backoff, and exhaustion loads the fallback error page.
//!
//! The monitor never owns views. It re-checks `is_destroyed` before every
//! navigation it starts and drops its state when the owner calls [`LoadMonitor::clear`].

use std::collections::HashMap;
use std::time::Instant;

use chorus_config::RecoverySettings;
use chorus_host::BrowserHost;
use chorus_types::{PaneIndex, ViewId};
use chorus_utils::urls_equivalent;

use crate::error_page::{PaneLoadErrorPage, build_pane_load_error_data_url};
use crate::recovery::{
    LoadFailure, PaneRecoveryState, RENDER_PROCESS_GONE_ERROR_CODE, RecoveryDecision,
    decide_pane_load_recovery,
};
use crate::timers::{TimerQueue, TimerTask};

/// Lookups the monitor needs but does not own.
pub trait RecoveryContext {
    /// Display name of the provider `view` belongs to.
    fn provider_name(&self, pane: PaneIndex, view: ViewId) -> String;

    /// Target to recover toward when a view fails before any target was marked.
    fn fallback_target_url(&self, pane: PaneIndex, view: ViewId) -> Option<String>;
}

/// A load failure as reported by the host.
#[derive(Debug, Clone, Copy)]
pub struct FailedLoad<'a> {
    pub error_code: i32,
    pub error_description: &'a str,
    pub validated_url: &'a str,
    pub is_main_frame: bool,
}

/// Where failure handling schedules follow-up work.
pub struct MonitorContext<'a> {
    pub host: &'a mut dyn BrowserHost,
    pub timers: &'a mut TimerQueue,
    pub recovery: &'a dyn RecoveryContext,
    pub now: Instant,
}

#[derive(Debug)]
pub struct LoadMonitor {
    settings: RecoverySettings,
    states: HashMap<ViewId, PaneRecoveryState>,
    panes: HashMap<ViewId, PaneIndex>,
}

impl LoadMonitor {
    #[must_use]
    pub fn new(settings: RecoverySettings) -> Self {
        Self {
            settings,
            states: HashMap::new(),
            panes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> RecoverySettings {
        self.settings
    }

    /// Start supervising `view` on behalf of `pane`.
    pub fn attach_pane(&mut self, pane: PaneIndex, view: ViewId) {
        self.panes.insert(view, pane);
    }

    #[must_use]
    pub fn is_attached(&self, view: ViewId) -> bool {
        self.panes.contains_key(&view)
    }

    /// Record the URL `view` is about to be sent to. Resets the attempt count.
    ///
    /// Must be called before every navigation the application itself starts.
    pub fn mark_target(&mut self, view: ViewId, target_url: &str) {
        self.states.insert(view, PaneRecoveryState::new(target_url));
    }

    #[must_use]
    pub fn state(&self, view: ViewId) -> Option<&PaneRecoveryState> {
        self.states.get(&view)
    }

    pub fn clear(&mut self, view: ViewId) {
        self.states.remove(&view);
        self.panes.remove(&view);
    }

    pub fn clear_all(&mut self) {
        self.states.clear();
        self.panes.clear();
    }

    /// A successful load of the tracked target resets its attempt count.
    pub fn handle_finish_load(&mut self, host: &dyn BrowserHost, view: ViewId) {
        if !self.is_attached(view) {
            return;
        }
        let Some(state) = self.states.get_mut(&view) else {
            return;
        };
        let Some(current_url) = host.current_url(view) else {
            return;
        };
        if urls_equivalent(&current_url, &state.target_url) && state.attempt_count != 0 {
            tracing::debug!(%view, target = %state.target_url, "Load recovered");
            state.attempt_count = 0;
        }
    }

    pub fn handle_fail_load(
        &mut self,
        ctx: &mut MonitorContext<'_>,
        view: ViewId,
        failure: FailedLoad<'_>,
    ) -> RecoveryDecision {
        let Some(pane) = self.panes.get(&view).copied() else {
            return RecoveryDecision::Ignore;
        };

        let target_url = match self.states.get(&view) {
            Some(state) => state.target_url.clone(),
            None => ctx
                .recovery
                .fallback_target_url(pane, view)
                .unwrap_or_default(),
        };

        let decision = decide_pane_load_recovery(&LoadFailure {
            is_main_frame: failure.is_main_frame,
            error_code: failure.error_code,
            failed_url: failure.validated_url,
            target_url: &target_url,
            max_retries: self.settings.max_retries,
            previous: self.states.get(&view),
        });

        match &decision {
            RecoveryDecision::Ignore => {
                tracing::debug!(
                    %view,
                    code = failure.error_code,
                    url = failure.validated_url,
                    "Ignoring load failure"
                );
            }
            RecoveryDecision::Retry(state) => {
                self.states.insert(view, state.clone());
                let delay = self.settings.retry_base_delay * state.attempt_count;
                tracing::info!(
                    %view,
                    pane = pane.value(),
                    attempt = state.attempt_count,
                    max_retries = self.settings.max_retries,
                    ?delay,
                    "Pane load failed ({}), retrying",
                    failure.error_code
                );
                ctx.timers.schedule(
                    ctx.now + delay,
                    TimerTask::RetryLoad {
                        view,
                        expected: state.clone(),
                    },
                );
            }
            RecoveryDecision::ShowError(state) => {
                self.states.insert(view, state.clone());
                tracing::warn!(
                    %view,
                    pane = pane.value(),
                    attempts = state.attempt_count,
                    target = %state.target_url,
                    "Pane load failed ({}): {}",
                    failure.error_code,
                    failure.error_description
                );
                if !ctx.host.is_destroyed(view) {
                    let provider_name = ctx.recovery.provider_name(pane, view);
                    let url = build_pane_load_error_data_url(&PaneLoadErrorPage {
                        provider_name: &provider_name,
                        error_code: failure.error_code,
                        error_description: failure.error_description,
                        attempt_count: state.attempt_count,
                        target_url: &state.target_url,
                    });
                    if let Err(e) = ctx.host.load_url(view, &url) {
                        tracing::warn!(%view, "Failed to show load error page: {e}");
                    }
                }
            }
        }

        decision
    }

    /// A renderer crash counts as a main-frame failure of the tracked target.
    pub fn handle_render_process_gone(
        &mut self,
        ctx: &mut MonitorContext<'_>,
        view: ViewId,
        reason: &str,
    ) -> RecoveryDecision {
        let Some(pane) = self.panes.get(&view).copied() else {
            return RecoveryDecision::Ignore;
        };
        let target_url = match self.states.get(&view) {
            Some(state) => state.target_url.clone(),
            None => ctx
                .recovery
                .fallback_target_url(pane, view)
                .unwrap_or_default(),
        };
        let description = format!("Render process gone: {reason}");
        self.handle_fail_load(
            ctx,
            view,
            FailedLoad {
                error_code: RENDER_PROCESS_GONE_ERROR_CODE,
                error_description: &description,
                validated_url: &target_url,
                is_main_frame: true,
            },
        )
    }

    /// Fire a queued retry. Returns `true` if a reload was started.
    ///
    /// Skipped when the tracked state moved on since scheduling (new target,
    /// newer failure, cleared) or the view is gone.
    pub fn fire_retry(
        &mut self,
        host: &mut dyn BrowserHost,
        view: ViewId,
        expected: &PaneRecoveryState,
    ) -> bool {
        if self.states.get(&view) != Some(expected) {
            tracing::debug!(%view, "Skipping superseded retry");
            return false;
        }
        if host.is_destroyed(view) {
            tracing::debug!(%view, "Skipping retry for destroyed view");
            return false;
        }
        match host.load_url(view, &expected.target_url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%view, "Retry navigation could not start: {e}");
                false
            }
        }
    }
}
