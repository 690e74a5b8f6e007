//! Pane load recovery policy.
//!
//! Decides what to do when an embedded provider page fails to load: ignore
//! the failure, reload the target again, or give up and show the fallback
//! error page.
//!
//! # Policy
//!
//! - Sub-frame failures never affect pane health.
//! - Aborted navigations (`ERR_ABORTED`) were superseded and are ignored.
//! - Failures are only counted against the URL the pane was told to load
//!   (the *target*). A failure from another origin is a stale signal from an
//!   earlier navigation and is ignored.
//! - Retries are counted per target: changing the target restarts the count.
//! - The attempt that exceeds `max_retries` shows the error page.

use chorus_utils::is_same_origin;

/// Chromium `net::ERR_ABORTED`: the navigation was cancelled or replaced.
pub const ERR_ABORTED: i32 = -3;

/// Error code reported when a pane's renderer process dies.
pub const RENDER_PROCESS_GONE_ERROR_CODE: i32 = -1000;

/// Retry bookkeeping for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRecoveryState {
    /// The URL the view is expected to be navigating to.
    pub target_url: String,
    /// Failed attempts toward `target_url` since the last successful load or
    /// the last time the target was set.
    pub attempt_count: u32,
}

impl PaneRecoveryState {
    #[must_use]
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            attempt_count: 0,
        }
    }
}

/// A main- or sub-frame load failure together with the retry history.
#[derive(Debug, Clone)]
pub struct LoadFailure<'a> {
    pub is_main_frame: bool,
    pub error_code: i32,
    pub failed_url: &'a str,
    pub target_url: &'a str,
    pub max_retries: u32,
    pub previous: Option<&'a PaneRecoveryState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryDecision {
    Ignore,
    Retry(PaneRecoveryState),
    ShowError(PaneRecoveryState),
}

impl RecoveryDecision {
    #[must_use]
    pub fn state(&self) -> Option<&PaneRecoveryState> {
        match self {
            Self::Ignore => None,
            Self::Retry(state) | Self::ShowError(state) => Some(state),
        }
    }
}

#[must_use]
pub fn decide_pane_load_recovery(failure: &LoadFailure<'_>) -> RecoveryDecision {
    if !failure.is_main_frame {
        return RecoveryDecision::Ignore;
    }
    if failure.error_code == ERR_ABORTED {
        return RecoveryDecision::Ignore;
    }

    let target_url = failure.target_url.trim();
    if target_url.is_empty() {
        return RecoveryDecision::Ignore;
    }

    let failed_url = failure.failed_url.trim();
    if !failed_url.is_empty() && !is_same_origin(failed_url, target_url) {
        return RecoveryDecision::Ignore;
    }

    let base_attempt_count = failure
        .previous
        .filter(|previous| previous.target_url == failure.target_url)
        .map_or(0, |previous| previous.attempt_count);

    let state = PaneRecoveryState {
        target_url: failure.target_url.to_string(),
        attempt_count: base_attempt_count.saturating_add(1),
    };

    if state.attempt_count <= failure.max_retries {
        RecoveryDecision::Retry(state)
    } else {
        RecoveryDecision::ShowError(state)
    }
}
