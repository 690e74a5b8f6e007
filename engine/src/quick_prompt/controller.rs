//! Overlay controller: builds the overlay view and wires its host signals
//! (load, console, blur, crash, keys) into the lifecycle.

use std::time::{Duration, Instant};

use chorus_config::QuickPromptSettings;
use chorus_host::{
    BrowserHost, ConsoleLevel, HostError, InputDisposition, KeyEventKind, KeyInput, ViewEvent,
    ViewIsolation, ViewRole, ViewSpec,
};
use chorus_types::{Rect, ViewId};

use super::anchor::AnchorTracker;
use super::lifecycle::{HideOptions, QuickPromptEnvironment, QuickPromptLifecycle};
use super::page::{
    QUICK_PROMPT_DEBUG_TAG, QUICK_PROMPT_OPENED_SCRIPT, QUICK_PROMPT_SUBMIT_SCRIPT,
    QuickPromptPageConfig, build_quick_prompt_data_url,
};
use crate::layout::BoundsResolver;
use crate::pane_view::PaneResolver;
use crate::timers::{TimerQueue, TimerTask};

/// Relayed debug lines are cut to this many characters.
pub const QUICK_PROMPT_DEBUG_MAX_CHARS: usize = 320;
/// Delay between losing focus and auto-hiding.
pub const QUICK_PROMPT_BLUR_HIDE_DELAY: Duration = Duration::from_millis(80);

/// Borrowed engine state the controller works against for one call.
pub struct QuickPromptContext<'a> {
    pub host: &'a mut dyn BrowserHost,
    pub anchor: &'a mut AnchorTracker,
    pub resolver: &'a dyn PaneResolver,
    pub bounds: &'a dyn BoundsResolver,
    pub timers: &'a mut TimerQueue,
    pub now: Instant,
}

struct OverlayEnv<'c, 'a> {
    ctx: &'c mut QuickPromptContext<'a>,
    page_url: &'c str,
}

impl QuickPromptEnvironment for OverlayEnv<'_, '_> {
    fn host(&mut self) -> &mut dyn BrowserHost {
        &mut *self.ctx.host
    }

    fn create_view(&mut self) -> Result<ViewId, HostError> {
        let host = &mut *self.ctx.host;
        let view = host.create_view(&overlay_view_spec())?;
        host.install_shortcut_hooks(view);
        if let Err(e) = host.load_url(view, self.page_url) {
            if let Err(close) = host.close_view(view) {
                tracing::debug!(%view, "Closing unusable quick prompt view: {close}");
            }
            return Err(e);
        }
        Ok(view)
    }

    fn bounds_for_height(&self, height: f64) -> Rect {
        self.ctx
            .bounds
            .quick_prompt_bounds(height, self.ctx.anchor.anchor())
    }

    fn sync_anchor(&mut self) {
        self.ctx
            .anchor
            .update_anchor_from_focused_view(&*self.ctx.host, self.ctx.resolver);
    }

    fn restore_primary_focus(&mut self) {
        self.ctx.host.focus_control_surface();
    }

    fn dispatch_opened(&mut self, view: ViewId) {
        if let Err(e) = self.ctx.host.execute_script(view, QUICK_PROMPT_OPENED_SCRIPT) {
            tracing::debug!(%view, "Quick prompt opened signal failed: {e}");
        }
    }
}

#[must_use]
pub fn overlay_view_spec() -> ViewSpec {
    ViewSpec {
        role: ViewRole::QuickPrompt,
        isolation: ViewIsolation::STRICT,
        transparent: true,
        additional_arguments: Vec::new(),
    }
}

/// Plain Enter submits; any modifier (Shift for a newline) passes through.
fn is_submit_key(input: &KeyInput) -> bool {
    input.kind == KeyEventKind::KeyDown
        && (matches!(input.key.as_str(), "Enter" | "Return") || input.code == "NumpadEnter")
}

fn has_modifier(input: &KeyInput) -> bool {
    input.shift || input.control || input.alt || input.meta
}

fn truncate_chars(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((end, _)) => &message[..end],
        None => message,
    }
}

#[derive(Debug, Clone)]
pub struct QuickPromptController {
    lifecycle: QuickPromptLifecycle,
    page_url: String,
}

impl QuickPromptController {
    #[must_use]
    pub fn new(settings: QuickPromptSettings) -> Self {
        let page_url = build_quick_prompt_data_url(&QuickPromptPageConfig::from_settings(&settings));
        Self {
            lifecycle: QuickPromptLifecycle::new(settings),
            page_url,
        }
    }

    fn with_env<R>(
        &mut self,
        ctx: &mut QuickPromptContext<'_>,
        f: impl FnOnce(&mut QuickPromptLifecycle, &mut dyn QuickPromptEnvironment) -> R,
    ) -> R {
        let mut env = OverlayEnv {
            ctx,
            page_url: &self.page_url,
        };
        f(&mut self.lifecycle, &mut env)
    }

    #[must_use]
    pub fn view(&self) -> Option<ViewId> {
        self.lifecycle.view()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.lifecycle.is_visible()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.lifecycle.height()
    }

    #[must_use]
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    #[must_use]
    pub fn owns_view(&self, view: ViewId) -> bool {
        self.lifecycle.view() == Some(view)
    }

    pub fn show(&mut self, ctx: &mut QuickPromptContext<'_>) -> bool {
        self.with_env(ctx, |lifecycle, env| lifecycle.show(env))
    }

    pub fn hide(&mut self, ctx: &mut QuickPromptContext<'_>, options: HideOptions) -> bool {
        self.with_env(ctx, |lifecycle, env| lifecycle.hide(env, options))
    }

    /// Show when hidden, hide when shown.
    ///
    /// A visible overlay that has lost focus is hidden without restoring focus
    /// and then shown again, so a stale overlay never swallows the toggle.
    pub fn toggle(&mut self, ctx: &mut QuickPromptContext<'_>) -> bool {
        if self.lifecycle.is_visible() {
            let focused = self
                .lifecycle
                .view()
                .is_some_and(|view| ctx.host.is_focused(view));
            if focused {
                return self.hide(ctx, HideOptions::default());
            }
            tracing::debug!("Quick prompt visible but unfocused; reopening");
            self.hide(ctx, HideOptions::without_focus_restore());
        }
        self.show(ctx)
    }

    /// Returns visibility and the stored height.
    pub fn resize(&mut self, ctx: &mut QuickPromptContext<'_>, height: f64) -> (bool, f64) {
        let height = self.with_env(ctx, |lifecycle, env| lifecycle.resize(env, height));
        (self.lifecycle.is_visible(), height)
    }

    pub fn relayout(&mut self, ctx: &mut QuickPromptContext<'_>) {
        self.with_env(ctx, |lifecycle, env| lifecycle.relayout(env));
    }

    pub fn destroy(&mut self, ctx: &mut QuickPromptContext<'_>) {
        self.with_env(ctx, |lifecycle, env| lifecycle.destroy(env));
    }

    /// Keep the overlay above pane views attached after it.
    pub fn restack(&self, host: &mut dyn BrowserHost) {
        if !self.lifecycle.is_visible() {
            return;
        }
        if let Some(view) = self.lifecycle.view()
            && let Err(e) = host.attach_view(view)
        {
            tracing::debug!(%view, "Quick prompt restack failed: {e}");
        }
    }

    /// Feed a host event. Returns `false` if `view` is not the overlay.
    pub fn handle_view_event(
        &mut self,
        ctx: &mut QuickPromptContext<'_>,
        view: ViewId,
        event: &ViewEvent,
    ) -> bool {
        if !self.owns_view(view) {
            return false;
        }
        match event {
            ViewEvent::DidFinishLoad => {
                self.with_env(ctx, |lifecycle, env| lifecycle.mark_ready(env));
            }
            ViewEvent::DidFailLoad {
                error_code,
                error_description,
                is_main_frame: true,
                ..
            } => {
                tracing::warn!(%view, error_code, "Quick prompt page failed to load: {error_description}");
            }
            ViewEvent::ConsoleMessage { level, message } => {
                relay_console_message(*level, message);
            }
            ViewEvent::Blurred => {
                if self.lifecycle.is_visible() {
                    ctx.timers.schedule(
                        ctx.now + QUICK_PROMPT_BLUR_HIDE_DELAY,
                        TimerTask::QuickPromptBlurHide { view },
                    );
                }
            }
            ViewEvent::RenderProcessGone { reason } => {
                tracing::warn!(%view, "Quick prompt renderer gone ({reason}); discarding overlay");
                self.destroy(ctx);
            }
            ViewEvent::DidFailLoad { .. } | ViewEvent::DidStopLoading | ViewEvent::Focused => {}
        }
        true
    }

    /// Intercept plain Enter in the overlay and turn it into a submit signal.
    pub fn handle_before_input(
        &mut self,
        host: &mut dyn BrowserHost,
        view: ViewId,
        input: &KeyInput,
    ) -> InputDisposition {
        if !self.owns_view(view) || !is_submit_key(input) || has_modifier(input) {
            return InputDisposition::Forward;
        }
        if let Err(e) = host.execute_script(view, QUICK_PROMPT_SUBMIT_SCRIPT) {
            tracing::debug!(%view, "Quick prompt submit signal failed: {e}");
        }
        InputDisposition::Consumed
    }

    /// Deferred blur auto-hide. Skipped unless the overlay is still visible,
    /// still the same view, alive, and unfocused.
    pub fn fire_blur_hide(&mut self, ctx: &mut QuickPromptContext<'_>, view: ViewId) -> bool {
        let still_current = self.lifecycle.is_visible()
            && self.owns_view(view)
            && !ctx.host.is_destroyed(view)
            && !ctx.host.is_focused(view);
        if !still_current {
            tracing::debug!(%view, "Skipping stale quick prompt blur hide");
            return false;
        }
        self.hide(ctx, HideOptions::without_focus_restore());
        true
    }
}

fn relay_console_message(level: ConsoleLevel, message: &str) {
    if !message.contains(QUICK_PROMPT_DEBUG_TAG) {
        return;
    }
    let line = truncate_chars(message, QUICK_PROMPT_DEBUG_MAX_CHARS);
    match level {
        ConsoleLevel::Warning | ConsoleLevel::Error => {
            tracing::warn!(target: "chorus::quick_prompt", "{line}");
        }
        ConsoleLevel::Verbose | ConsoleLevel::Info => {
            tracing::debug!(target: "chorus::quick_prompt", "{line}");
        }
    }
}
