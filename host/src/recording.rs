//! In-memory [`BrowserHost`] that records calls and synthesizes events.

use std::collections::{HashMap, HashSet};
use std::mem;

use chorus_types::{Rect, ViewId};

use crate::{BrowserHost, HostError, HostEvent, ViewEvent, ViewRole, ViewSpec};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chorus/0.0.0 Chrome/130.0.0.0 Electron/33.0.0 Safari/537.36";

/// One observed call into the host, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateView { view: ViewId, role: ViewRole },
    LoadUrl { view: ViewId, url: String },
    Attach(ViewId),
    Detach(ViewId),
    SetBounds { view: ViewId, bounds: Rect },
    Focus(ViewId),
    FocusControlSurface,
    Close(ViewId),
    SetUserAgent {
        view: ViewId,
        user_agent: String,
        accept_languages: String,
    },
    SetZoomFactor { view: ViewId, factor: f64 },
    ExecuteScript { view: ViewId, script: String },
    ControlScript(String),
    InstallShortcutHooks(ViewId),
    InstallContextMenu(ViewId),
}

#[derive(Debug)]
struct ViewRecord {
    spec: ViewSpec,
    url: Option<String>,
    loading: bool,
    destroyed: bool,
    bounds: Option<Rect>,
    user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    View(ViewId),
    ControlSurface,
}

#[derive(Debug)]
pub struct RecordingHost {
    next_view_id: u64,
    views: HashMap<ViewId, ViewRecord>,
    /// Attached views, bottom to top.
    content_tree: Vec<ViewId>,
    focus: Option<Focus>,
    calls: Vec<HostCall>,
    refuse_loads: HashSet<ViewId>,
    refuse_create: bool,
    refuse_control_scripts: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            next_view_id: 0,
            views: HashMap::new(),
            content_tree: Vec::new(),
            focus: Some(Focus::ControlSurface),
            calls: Vec::new(),
            refuse_loads: HashSet::new(),
            refuse_create: false,
            refuse_control_scripts: false,
        }
    }
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drain recorded calls, typically between test phases.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        mem::take(&mut self.calls)
    }

    /// URLs requested via `load_url` for `view`, in order.
    #[must_use]
    pub fn loads_for(&self, view: ViewId) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::LoadUrl { view: v, url } if *v == view => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn content_tree(&self) -> &[ViewId] {
        &self.content_tree
    }

    #[must_use]
    pub fn is_attached(&self, view: ViewId) -> bool {
        self.content_tree.contains(&view)
    }

    #[must_use]
    pub fn role_of(&self, view: ViewId) -> Option<ViewRole> {
        self.views.get(&view).map(|record| record.spec.role)
    }

    #[must_use]
    pub fn spec_of(&self, view: ViewId) -> Option<&ViewSpec> {
        self.views.get(&view).map(|record| &record.spec)
    }

    #[must_use]
    pub fn bounds_of(&self, view: ViewId) -> Option<Rect> {
        self.views.get(&view).and_then(|record| record.bounds)
    }

    /// Live (not destroyed) views in creation order.
    #[must_use]
    pub fn live_views(&self) -> Vec<ViewId> {
        let mut live: Vec<ViewId> = self
            .views
            .iter()
            .filter(|(_, record)| !record.destroyed)
            .map(|(id, _)| *id)
            .collect();
        live.sort();
        live
    }

    #[must_use]
    pub fn control_surface_focused(&self) -> bool {
        self.focus == Some(Focus::ControlSurface)
    }

    // ------------------------------------------------------------------
    // Failure injection
    // ------------------------------------------------------------------

    /// Make every later `load_url` on `view` fail to initiate.
    pub fn refuse_loads_for(&mut self, view: ViewId) {
        self.refuse_loads.insert(view);
    }

    pub fn refuse_view_creation(&mut self, refuse: bool) {
        self.refuse_create = refuse;
    }

    pub fn refuse_control_scripts(&mut self, refuse: bool) {
        self.refuse_control_scripts = refuse;
    }

    // ------------------------------------------------------------------
    // Event synthesis
    // ------------------------------------------------------------------

    /// Complete the in-flight main-frame load.
    pub fn finish_load(&mut self, view: ViewId) -> HostEvent {
        if let Some(record) = self.views.get_mut(&view) {
            record.loading = false;
        }
        HostEvent::new(view, ViewEvent::DidFinishLoad)
    }

    /// Fail the in-flight main-frame load against the view's current URL.
    pub fn fail_load(&mut self, view: ViewId, error_code: i32, description: &str) -> HostEvent {
        let validated_url = self.current_url(view).unwrap_or_default();
        if let Some(record) = self.views.get_mut(&view) {
            record.loading = false;
        }
        HostEvent::new(
            view,
            ViewEvent::DidFailLoad {
                error_code,
                error_description: description.to_string(),
                validated_url,
                is_main_frame: true,
            },
        )
    }

    /// Report loading stopped. Does not change the main-frame loading flag.
    #[must_use]
    pub fn stop_loading(&self, view: ViewId) -> HostEvent {
        HostEvent::new(view, ViewEvent::DidStopLoading)
    }

    pub fn crash(&mut self, view: ViewId, reason: &str) -> HostEvent {
        if let Some(record) = self.views.get_mut(&view) {
            record.loading = false;
        }
        HostEvent::new(
            view,
            ViewEvent::RenderProcessGone {
                reason: reason.to_string(),
            },
        )
    }

    /// Simulate the user navigating inside the page (link click, SPA route).
    pub fn navigate_in_page(&mut self, view: ViewId, url: &str) {
        if let Some(record) = self.views.get_mut(&view) {
            record.url = Some(url.to_string());
        }
    }

    /// Simulate the user clicking into a view. Returns the focus event.
    pub fn user_focus(&mut self, view: ViewId) -> HostEvent {
        self.focus = Some(Focus::View(view));
        HostEvent::new(view, ViewEvent::Focused)
    }

    /// Simulate focus leaving `view` for some other window. Returns the blur event.
    pub fn user_blur(&mut self, view: ViewId) -> HostEvent {
        if self.focus == Some(Focus::View(view)) {
            self.focus = None;
        }
        HostEvent::new(view, ViewEvent::Blurred)
    }

    fn record_mut(&mut self, view: ViewId) -> Result<&mut ViewRecord, HostError> {
        match self.views.get_mut(&view) {
            Some(record) if record.destroyed => Err(HostError::Destroyed(view)),
            Some(record) => Ok(record),
            None => Err(HostError::UnknownView(view)),
        }
    }
}

impl BrowserHost for RecordingHost {
    fn create_view(&mut self, spec: &ViewSpec) -> Result<ViewId, HostError> {
        if self.refuse_create {
            return Err(HostError::Native("view creation refused".to_string()));
        }
        self.next_view_id += 1;
        let view = ViewId::new(self.next_view_id);
        self.views.insert(
            view,
            ViewRecord {
                spec: spec.clone(),
                url: None,
                loading: false,
                destroyed: false,
                bounds: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        );
        self.calls.push(HostCall::CreateView {
            view,
            role: spec.role,
        });
        Ok(view)
    }

    fn close_view(&mut self, view: ViewId) -> Result<(), HostError> {
        self.record_mut(view)?.destroyed = true;
        self.content_tree.retain(|v| *v != view);
        if self.focus == Some(Focus::View(view)) {
            self.focus = None;
        }
        self.calls.push(HostCall::Close(view));
        Ok(())
    }

    fn is_destroyed(&self, view: ViewId) -> bool {
        self.views.get(&view).is_none_or(|record| record.destroyed)
    }

    fn load_url(&mut self, view: ViewId, url: &str) -> Result<(), HostError> {
        self.calls.push(HostCall::LoadUrl {
            view,
            url: url.to_string(),
        });
        if self.refuse_loads.contains(&view) {
            return Err(HostError::Navigation {
                view,
                url: url.to_string(),
                message: "refused by recording host".to_string(),
            });
        }
        let record = self.record_mut(view)?;
        record.url = Some(url.to_string());
        record.loading = true;
        Ok(())
    }

    fn current_url(&self, view: ViewId) -> Option<String> {
        self.views.get(&view).and_then(|record| record.url.clone())
    }

    fn is_loading_main_frame(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|record| record.loading)
    }

    fn attach_view(&mut self, view: ViewId) -> Result<(), HostError> {
        self.record_mut(view)?;
        self.content_tree.retain(|v| *v != view);
        self.content_tree.push(view);
        self.calls.push(HostCall::Attach(view));
        Ok(())
    }

    fn detach_view(&mut self, view: ViewId) -> Result<(), HostError> {
        self.calls.push(HostCall::Detach(view));
        self.record_mut(view)?;
        if !self.content_tree.contains(&view) {
            return Err(HostError::NotAttached(view));
        }
        self.content_tree.retain(|v| *v != view);
        if self.focus == Some(Focus::View(view)) {
            self.focus = None;
        }
        Ok(())
    }

    fn set_bounds(&mut self, view: ViewId, bounds: Rect) -> Result<(), HostError> {
        self.record_mut(view)?.bounds = Some(bounds);
        self.calls.push(HostCall::SetBounds { view, bounds });
        Ok(())
    }

    fn focus_view(&mut self, view: ViewId) -> Result<(), HostError> {
        self.record_mut(view)?;
        self.focus = Some(Focus::View(view));
        self.calls.push(HostCall::Focus(view));
        Ok(())
    }

    fn is_focused(&self, view: ViewId) -> bool {
        self.focus == Some(Focus::View(view))
    }

    fn focused_view(&self) -> Option<ViewId> {
        match self.focus {
            Some(Focus::View(view)) if !self.is_destroyed(view) => Some(view),
            _ => None,
        }
    }

    fn focus_control_surface(&mut self) {
        self.focus = Some(Focus::ControlSurface);
        self.calls.push(HostCall::FocusControlSurface);
    }

    fn user_agent(&self, view: ViewId) -> Option<String> {
        self.views
            .get(&view)
            .filter(|record| !record.destroyed)
            .map(|record| record.user_agent.clone())
    }

    fn set_user_agent(
        &mut self,
        view: ViewId,
        user_agent: &str,
        accept_languages: &str,
    ) -> Result<(), HostError> {
        self.record_mut(view)?.user_agent = user_agent.to_string();
        self.calls.push(HostCall::SetUserAgent {
            view,
            user_agent: user_agent.to_string(),
            accept_languages: accept_languages.to_string(),
        });
        Ok(())
    }

    fn set_zoom_factor(&mut self, view: ViewId, factor: f64) -> Result<(), HostError> {
        self.record_mut(view)?;
        self.calls.push(HostCall::SetZoomFactor { view, factor });
        Ok(())
    }

    fn execute_script(&mut self, view: ViewId, script: &str) -> Result<(), HostError> {
        self.record_mut(view)?;
        self.calls.push(HostCall::ExecuteScript {
            view,
            script: script.to_string(),
        });
        Ok(())
    }

    fn execute_control_script(&mut self, script: &str) -> Result<(), HostError> {
        if self.refuse_control_scripts {
            return Err(HostError::Script("control surface unavailable".to_string()));
        }
        self.calls.push(HostCall::ControlScript(script.to_string()));
        Ok(())
    }

    fn install_shortcut_hooks(&mut self, view: ViewId) {
        self.calls.push(HostCall::InstallShortcutHooks(view));
    }

    fn install_context_menu(&mut self, view: ViewId) {
        self.calls.push(HostCall::InstallContextMenu(view));
    }
}
