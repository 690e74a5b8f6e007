//! Which pane the quick prompt overlay sits over.

use chorus_host::BrowserHost;
use chorus_types::PaneIndex;

use crate::pane_view::PaneResolver;

/// Tracks the pane that last held keyboard focus. Positioning only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorTracker {
    anchor: PaneIndex,
}

impl AnchorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn anchor(&self) -> PaneIndex {
        self.anchor
    }

    pub fn set_anchor(&mut self, pane: PaneIndex) {
        self.anchor = pane;
    }

    /// Accepts finite, non-negative integral values only. Returns whether the
    /// anchor was updated.
    #[allow(clippy::float_cmp)]
    pub fn set_anchor_pane_index(&mut self, value: f64) -> bool {
        if !value.is_finite() || value < 0.0 || value.trunc() != value {
            return false;
        }
        if value > usize::MAX as f64 {
            return false;
        }
        self.anchor = PaneIndex::new(value as usize);
        true
    }

    /// Never point past the last remaining pane.
    pub fn clamp_to_last(&mut self, last: PaneIndex) {
        if self.anchor > last {
            self.anchor = last;
        }
    }

    /// Anchor to the pane owning the focused view, if any.
    pub fn update_anchor_from_focused_view(
        &mut self,
        host: &dyn BrowserHost,
        resolver: &dyn PaneResolver,
    ) -> bool {
        match host.focused_view().and_then(|view| resolver.pane_for_view(view)) {
            Some(pane) => {
                self.anchor = pane;
                true
            }
            None => false,
        }
    }
}
