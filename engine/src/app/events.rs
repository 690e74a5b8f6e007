//! Host signals and deferred work.

use chorus_host::{BrowserHost, HostEvent, InputDisposition, KeyInput, ViewEvent};
use chorus_types::ViewId;

use super::App;
use crate::load_monitor::{FailedLoad, MonitorContext};
use crate::pane_view::PaneResolver;
use crate::quick_prompt::QuickPromptContext;
use crate::timers::TimerTask;

impl<H: BrowserHost> App<H> {
    /// Route one host signal to whoever owns the view.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        let HostEvent { view, event } = event;

        if self.quick_prompt.owns_view(view) {
            self.quick_prompt
                .handle_view_event(&mut quick_prompt_context!(self), view, &event);
            return;
        }

        match &event {
            ViewEvent::DidFinishLoad => {
                self.monitor.handle_finish_load(&self.host, view);
                self.views.handle_finish_load(&mut self.host, view);
                self.panes.handle_finish_load(&self.host, view);
            }
            ViewEvent::DidFailLoad {
                error_code,
                error_description,
                validated_url,
                is_main_frame,
            } => {
                self.handle_fail_load(
                    view,
                    FailedLoad {
                        error_code: *error_code,
                        error_description,
                        validated_url,
                        is_main_frame: *is_main_frame,
                    },
                );
                self.bridge.handle_view_event(&mut self.host, view, &event);
            }
            ViewEvent::DidStopLoading => {
                self.bridge.handle_view_event(&mut self.host, view, &event);
            }
            ViewEvent::RenderProcessGone { reason } => {
                tracing::warn!(%view, "Pane renderer gone: {reason}");
                let lookup = self.panes.recovery_lookup(&self.config.catalog);
                let mut ctx = MonitorContext {
                    host: &mut self.host,
                    timers: &mut self.timers,
                    recovery: &lookup,
                    now: self.clock.now(),
                };
                self.monitor
                    .handle_render_process_gone(&mut ctx, view, reason);
            }
            ViewEvent::Focused => {
                if let Some(pane) = self.views.pane_for_view(view) {
                    self.anchor.set_anchor(pane);
                }
            }
            ViewEvent::Blurred | ViewEvent::ConsoleMessage { .. } => {}
        }
    }

    fn handle_fail_load(&mut self, view: ViewId, failure: FailedLoad<'_>) {
        let lookup = self.panes.recovery_lookup(&self.config.catalog);
        let mut ctx = MonitorContext {
            host: &mut self.host,
            timers: &mut self.timers,
            recovery: &lookup,
            now: self.clock.now(),
        };
        let decision = self.monitor.handle_fail_load(&mut ctx, view, failure);
        tracing::debug!(%view, ?decision, "Handled load failure");
    }

    /// Key events observed before the page sees them.
    pub fn handle_before_input(&mut self, view: ViewId, input: &KeyInput) -> InputDisposition {
        self.quick_prompt
            .handle_before_input(&mut self.host, view, input)
    }

    /// Run every timer task that is due. Returns how many tasks ran.
    pub fn run_due_timers(&mut self) -> usize {
        let due = self.timers.take_due(self.clock.now());
        let count = due.len();
        for task in due {
            match task {
                TimerTask::RetryLoad { view, expected } => {
                    if self.monitor.fire_retry(&mut self.host, view, &expected) {
                        tracing::info!(%view, attempt = expected.attempt_count, "Retrying pane load");
                    }
                }
                TimerTask::QuickPromptBlurHide { view } => {
                    self.quick_prompt
                        .fire_blur_hide(&mut quick_prompt_context!(self), view);
                }
            }
        }
        count
    }
}
