//! Core engine for Chorus: pane lifecycle, load recovery and the quick prompt
//! overlay.
//!
//! The engine is a synchronous state machine over a [`chorus_host::BrowserHost`].
//! It never blocks and never spawns; browser signals are fed in through
//! [`App::handle_host_event`] and deferred work (retries, overlay auto-hide)
//! runs from [`App::run_due_timers`].

mod app;
mod error_page;
mod layout;
mod load_monitor;
mod pane_view;
mod panes;
mod persistence;
mod quick_prompt;
mod recovery;
mod sidebar;
mod timers;

pub use app::App;
pub use error_page::{PaneLoadErrorPage, build_pane_load_error_data_url, render_pane_load_error_html};
pub use layout::{BoundsResolver, SplitLayout};
pub use load_monitor::{FailedLoad, LoadMonitor, MonitorContext, RecoveryContext};
pub use pane_view::{NavigationErrorHandler, PANE_INDEX_ARGUMENT, PaneResolver, PaneViewService};
pub use panes::{
    CachedView, PaneContext, PaneCountOutcome, PaneError, PaneOrchestrator, PaneRecoveryLookup,
    PaneViewState, ProviderSwitchOutcome,
};
pub use persistence::{ConfigFileStore, ProviderPreferenceStore};
pub use quick_prompt::{
    AnchorTracker, HideOptions, QUICK_PROMPT_BLUR_HIDE_DELAY, QUICK_PROMPT_DEBUG_MAX_CHARS,
    QUICK_PROMPT_DEBUG_TAG, QUICK_PROMPT_OPENED_EVENT, QUICK_PROMPT_OPENED_SCRIPT,
    QUICK_PROMPT_SUBMIT_EVENT, QUICK_PROMPT_SUBMIT_SCRIPT, QuickPromptContext,
    QuickPromptController, QuickPromptEnvironment, QuickPromptLifecycle, QuickPromptPageConfig,
    build_quick_prompt_data_url, overlay_view_spec, render_quick_prompt_html,
};
pub use recovery::{
    ERR_ABORTED, LoadFailure, PaneRecoveryState, RENDER_PROCESS_GONE_ERROR_CODE, RecoveryDecision,
    decide_pane_load_recovery,
};
pub use sidebar::{PANE_LOADING_EVENT, SidebarBridge, SidebarNotification};
pub use timers::{Clock, ManualClock, SystemClock, TimerQueue, TimerTask};
