//! Shared test utilities and fixtures
//!
//! Every scenario runs the real engine over the recording host with a manual
//! clock, so retries and overlay auto-hide are driven by `advance`.

#![allow(dead_code)]

use std::time::Duration;

use chorus_config::{RecoverySettings, ResolvedConfig};
use chorus_engine::{App, ManualClock, PANE_LOADING_EVENT};
use chorus_host::{HostCall, RecordingHost};
use chorus_types::ViewId;

pub struct Harness {
    pub app: App<RecordingHost>,
    pub clock: ManualClock,
}

impl Harness {
    /// Default configuration: three panes, chatgpt / claude / gemini.
    pub fn new() -> Self {
        Self::with_config(ResolvedConfig::default())
    }

    pub fn with_config(config: ResolvedConfig) -> Self {
        let clock = ManualClock::new();
        let mut app = App::new(RecordingHost::new(), config, Box::new(clock.clone()));
        app.initialize();
        app.host_mut().take_calls();
        Self { app, clock }
    }

    pub fn with_recovery(max_retries: u32, base_delay_ms: u64) -> Self {
        let mut config = ResolvedConfig::default();
        config.recovery = RecoverySettings {
            max_retries,
            retry_base_delay: Duration::from_millis(base_delay_ms),
        };
        Self::with_config(config)
    }

    pub fn view(&self, pane: usize) -> ViewId {
        self.app.panes().pane(pane).expect("pane exists").view
    }

    pub fn overlay(&self) -> ViewId {
        self.app.quick_prompt().view().expect("overlay created")
    }

    pub fn advance_ms(&mut self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms));
        self.app.run_due_timers()
    }

    pub fn fail(&mut self, view: ViewId, code: i32) {
        let event = self.app.host_mut().fail_load(view, code, "ERR_NAME_NOT_RESOLVED");
        self.app.handle_host_event(event);
    }

    pub fn finish(&mut self, view: ViewId) {
        let event = self.app.host_mut().finish_load(view);
        self.app.handle_host_event(event);
    }

    pub fn stop(&mut self, view: ViewId) {
        let event = self.app.host().stop_loading(view);
        self.app.handle_host_event(event);
    }

    pub fn focus(&mut self, view: ViewId) {
        let event = self.app.host_mut().user_focus(view);
        self.app.handle_host_event(event);
    }

    pub fn blur(&mut self, view: ViewId) {
        let event = self.app.host_mut().user_blur(view);
        self.app.handle_host_event(event);
    }
}

/// `(pane, loading)` pairs sent to the control surface, in order.
pub fn loading_notifications(host: &RecordingHost) -> Vec<(u64, bool)> {
    host.calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::ControlScript(script) if script.contains(PANE_LOADING_EVENT) => {
                let start = script.find("detail: ")? + "detail: ".len();
                let end = script.rfind(" })")?;
                let detail: serde_json::Value = serde_json::from_str(&script[start..end]).ok()?;
                Some((detail["paneIndex"].as_u64()?, detail["loading"].as_bool()?))
            }
            _ => None,
        })
        .collect()
}

pub fn created_views(host: &RecordingHost) -> usize {
    host.calls()
        .iter()
        .filter(|call| matches!(call, HostCall::CreateView { .. }))
        .count()
}

pub fn closed_views(host: &RecordingHost) -> Vec<ViewId> {
    host.calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::Close(view) => Some(*view),
            _ => None,
        })
        .collect()
}
