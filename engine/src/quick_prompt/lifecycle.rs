//! Overlay view state machine: `{ view, visible, ready, height }`.
//!
//! The lifecycle owns no host policy. Creating the view, computing bounds,
//! restoring focus and telling the page it was opened all go through
//! [`QuickPromptEnvironment`], which the controller implements per call.

use chorus_config::QuickPromptSettings;
use chorus_host::{BrowserHost, HostError};
use chorus_types::{Rect, ViewId};

/// What the lifecycle needs from its surroundings.
pub trait QuickPromptEnvironment {
    fn host(&mut self) -> &mut dyn BrowserHost;

    /// Build a new overlay view. Called at most once per lifecycle generation.
    fn create_view(&mut self) -> Result<ViewId, HostError>;

    fn bounds_for_height(&self, height: f64) -> Rect;

    /// Re-anchor to whichever pane currently holds focus.
    fn sync_anchor(&mut self);

    /// Give keyboard focus back to the main window.
    fn restore_primary_focus(&mut self);

    /// Tell the overlay page it was opened (resets its draft).
    fn dispatch_opened(&mut self, view: ViewId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideOptions {
    pub restore_focus: bool,
}

impl Default for HideOptions {
    fn default() -> Self {
        Self {
            restore_focus: true,
        }
    }
}

impl HideOptions {
    #[must_use]
    pub fn without_focus_restore() -> Self {
        Self {
            restore_focus: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuickPromptLifecycle {
    settings: QuickPromptSettings,
    view: Option<ViewId>,
    visible: bool,
    ready: bool,
    height: f64,
}

impl QuickPromptLifecycle {
    #[must_use]
    pub fn new(settings: QuickPromptSettings) -> Self {
        let height = settings.clamp_height(settings.default_height);
        Self {
            settings,
            view: None,
            visible: false,
            ready: false,
            height,
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn settings(&self) -> &QuickPromptSettings {
        &self.settings
    }

    fn default_height(&self) -> f64 {
        self.settings.clamp_height(self.settings.default_height)
    }

    /// Create the overlay view on first use; later calls return the same view.
    pub fn ensure_view(&mut self, env: &mut dyn QuickPromptEnvironment) -> Result<ViewId, HostError> {
        if let Some(view) = self.view {
            return Ok(view);
        }
        let view = env.create_view()?;
        tracing::debug!(%view, "Created quick prompt view");
        self.view = Some(view);
        Ok(view)
    }

    /// Show the overlay. Already-visible overlays are left alone.
    ///
    /// Returns the resulting visibility.
    pub fn show(&mut self, env: &mut dyn QuickPromptEnvironment) -> bool {
        if self.visible {
            return true;
        }
        let view = match self.ensure_view(env) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!("Quick prompt view could not be created: {e}");
                return false;
            }
        };

        env.sync_anchor();
        self.height = self.default_height();
        let bounds = env.bounds_for_height(self.height);
        let host = env.host();
        if let Err(e) = host.attach_view(view) {
            tracing::warn!(%view, "Quick prompt attach failed: {e}");
            return false;
        }
        if let Err(e) = host.set_bounds(view, bounds) {
            tracing::debug!(%view, "Quick prompt bounds failed: {e}");
        }
        if let Err(e) = host.focus_view(view) {
            tracing::debug!(%view, "Quick prompt focus failed: {e}");
        }
        self.visible = true;
        tracing::info!(%view, "Quick prompt shown");

        if self.ready {
            env.dispatch_opened(view);
        }
        true
    }

    /// Hide the overlay. Returns the resulting visibility (always `false`).
    pub fn hide(&mut self, env: &mut dyn QuickPromptEnvironment, options: HideOptions) -> bool {
        if !self.visible {
            return false;
        }
        if let Some(view) = self.view
            && let Err(e) = env.host().detach_view(view)
        {
            tracing::debug!(%view, "Quick prompt detach: {e}");
        }
        self.visible = false;
        self.height = self.default_height();
        if options.restore_focus {
            env.restore_primary_focus();
        }
        tracing::info!(restore_focus = options.restore_focus, "Quick prompt hidden");
        false
    }

    /// Store a new clamped height and reposition when visible. Non-finite
    /// requests leave everything unchanged.
    pub fn resize(&mut self, env: &mut dyn QuickPromptEnvironment, next_height: f64) -> f64 {
        if !next_height.is_finite() {
            return self.height;
        }
        self.height = self.settings.clamp_height(next_height);
        self.relayout(env);
        self.height
    }

    /// Reposition at the current height if visible.
    pub fn relayout(&mut self, env: &mut dyn QuickPromptEnvironment) {
        if !self.visible {
            return;
        }
        let Some(view) = self.view else {
            return;
        };
        let bounds = env.bounds_for_height(self.height);
        if let Err(e) = env.host().set_bounds(view, bounds) {
            tracing::debug!(%view, "Quick prompt relayout failed: {e}");
        }
    }

    /// The overlay page finished its first load.
    pub fn mark_ready(&mut self, env: &mut dyn QuickPromptEnvironment) {
        if self.ready {
            return;
        }
        self.ready = true;
        if self.visible
            && let Some(view) = self.view
        {
            env.dispatch_opened(view);
        }
    }

    /// Close the overlay view and return to the initial state.
    pub fn destroy(&mut self, env: &mut dyn QuickPromptEnvironment) {
        if let Some(view) = self.view.take() {
            let host = env.host();
            if self.visible
                && let Err(e) = host.detach_view(view)
            {
                tracing::debug!(%view, "Quick prompt detach during destroy: {e}");
            }
            if !host.is_destroyed(view)
                && let Err(e) = host.close_view(view)
            {
                tracing::debug!(%view, "Quick prompt close failed: {e}");
            }
            tracing::info!(%view, "Quick prompt destroyed");
        }
        self.visible = false;
        self.ready = false;
        self.height = self.default_height();
    }
}
