//! The embedded-browser seam.
//!
//! The pane core never talks to a concrete browser engine. It sees a narrow
//! capability set through [`BrowserHost`] and receives engine-originated
//! signals as [`HostEvent`] values routed by [`ViewId`].
//!
//! Every `BrowserHost` method is non-blocking. Navigation and script methods
//! only report whether the request could be *initiated*; the eventual outcome
//! arrives later as a [`ViewEvent`].
//!
//! [`RecordingHost`] is an in-memory implementation that records every call
//! and lets callers synthesize engine events. The engine's tests and the
//! headless `chorus` driver both run on it.

mod recording;

pub use recording::{HostCall, RecordingHost};

use chorus_types::{PaneIndex, Rect, ViewId};
use thiserror::Error;

// ============================================================================
// View construction
// ============================================================================

/// What a view is for. Carried into the host so it can tag preload code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewRole {
    Pane(PaneIndex),
    QuickPrompt,
}

/// Scripting isolation requested for a new view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewIsolation {
    /// Page scripts run in a separate world from preload code.
    pub context_isolation: bool,
    /// Host (native) capabilities exposed to page scripts.
    pub host_integration: bool,
    pub sandbox: bool,
}

impl ViewIsolation {
    /// Isolated, sandboxed, no host capabilities.
    pub const STRICT: Self = Self {
        context_isolation: true,
        host_integration: false,
        sandbox: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpec {
    pub role: ViewRole,
    pub isolation: ViewIsolation,
    pub transparent: bool,
    /// Extra arguments handed to the view's preload/runtime (e.g. `--chorus-pane-index=2`).
    pub additional_arguments: Vec<String>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{0} does not exist")]
    UnknownView(ViewId),
    #[error("{0} has been destroyed")]
    Destroyed(ViewId),
    #[error("{0} is not attached to the content tree")]
    NotAttached(ViewId),
    #[error("navigation of {view} to {url} could not start: {message}")]
    Navigation {
        view: ViewId,
        url: String,
        message: String,
    },
    #[error("script dispatch failed: {0}")]
    Script(String),
    #[error("{0}")]
    Native(String),
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
    Char,
}

/// A keyboard event observed before the page receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub kind: KeyEventKind,
    /// DOM `key` value (`"Enter"`, `"a"`, ...).
    pub key: String,
    /// DOM `code` value (`"Enter"`, `"NumpadEnter"`, ...).
    pub code: String,
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    #[must_use]
    pub fn key_down(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: KeyEventKind::KeyDown,
            key: key.into(),
            code: code.into(),
            shift: false,
            control: false,
            alt: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Whether the host should still deliver a key event to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    Forward,
    Consumed,
}

/// Engine-originated signal for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The main frame finished loading.
    DidFinishLoad,
    /// A frame failed to load (or a navigation was cancelled).
    DidFailLoad {
        error_code: i32,
        error_description: String,
        validated_url: String,
        is_main_frame: bool,
    },
    /// All loading activity for the view stopped.
    DidStopLoading,
    RenderProcessGone {
        reason: String,
    },
    Focused,
    Blurred,
    ConsoleMessage {
        level: ConsoleLevel,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub view: ViewId,
    pub event: ViewEvent,
}

impl HostEvent {
    #[must_use]
    pub fn new(view: ViewId, event: ViewEvent) -> Self {
        Self { view, event }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Capability set the pane core needs from an embedded-browser binding.
pub trait BrowserHost {
    fn create_view(&mut self, spec: &ViewSpec) -> Result<ViewId, HostError>;

    /// Destroy a view. Closing an already destroyed view is an error the
    /// caller may ignore.
    fn close_view(&mut self, view: ViewId) -> Result<(), HostError>;

    fn is_destroyed(&self, view: ViewId) -> bool;

    /// Start navigating. `Ok` only means the navigation was initiated.
    fn load_url(&mut self, view: ViewId, url: &str) -> Result<(), HostError>;

    fn current_url(&self, view: ViewId) -> Option<String>;

    fn is_loading_main_frame(&self, view: ViewId) -> bool;

    /// Add a view to the window's content tree, on top of existing children.
    /// Attaching an attached view moves it to the top.
    fn attach_view(&mut self, view: ViewId) -> Result<(), HostError>;

    fn detach_view(&mut self, view: ViewId) -> Result<(), HostError>;

    fn set_bounds(&mut self, view: ViewId, bounds: Rect) -> Result<(), HostError>;

    fn focus_view(&mut self, view: ViewId) -> Result<(), HostError>;

    fn is_focused(&self, view: ViewId) -> bool;

    /// The embedded view that currently holds keyboard focus, if any.
    fn focused_view(&self) -> Option<ViewId>;

    /// Give focus back to the primary control surface (sidebar / composer).
    fn focus_control_surface(&mut self);

    fn user_agent(&self, view: ViewId) -> Option<String>;

    fn set_user_agent(
        &mut self,
        view: ViewId,
        user_agent: &str,
        accept_languages: &str,
    ) -> Result<(), HostError>;

    fn set_zoom_factor(&mut self, view: ViewId, factor: f64) -> Result<(), HostError>;

    /// Fire-and-forget script execution inside a view's page.
    fn execute_script(&mut self, view: ViewId, script: &str) -> Result<(), HostError>;

    /// Fire-and-forget script execution inside the control surface.
    fn execute_control_script(&mut self, script: &str) -> Result<(), HostError>;

    fn install_shortcut_hooks(&mut self, view: ViewId);

    fn install_context_menu(&mut self, view: ViewId);
}
