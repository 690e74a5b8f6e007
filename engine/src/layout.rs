//! Window geometry for panes and the quick prompt overlay.

use chorus_config::WindowSettings;
use chorus_types::{PaneCount, PaneIndex, Rect};

/// Resolves where views go in the window.
pub trait BoundsResolver {
    fn pane_bounds(&self, pane: PaneIndex) -> Rect;

    /// Overlay rectangle for a requested height, positioned over `anchor`.
    fn quick_prompt_bounds(&self, height: f64, anchor: PaneIndex) -> Rect;
}

const OVERLAY_SIDE_MARGIN: u32 = 24;
const OVERLAY_BOTTOM_MARGIN: u32 = 24;
const OVERLAY_MAX_WIDTH: u32 = 720;

/// Panes side by side to the right of the sidebar, overlay centered near the
/// bottom of its anchor pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLayout {
    width: u32,
    height: u32,
    sidebar_width: u32,
    pane_count: PaneCount,
}

impl SplitLayout {
    #[must_use]
    pub fn new(window: WindowSettings, pane_count: PaneCount) -> Self {
        Self {
            width: window.width,
            height: window.height,
            sidebar_width: window.sidebar_width,
            pane_count,
        }
    }

    pub fn set_pane_count(&mut self, pane_count: PaneCount) {
        self.pane_count = pane_count;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[must_use]
    pub fn pane_count(&self) -> PaneCount {
        self.pane_count
    }

    fn content_width(&self) -> u32 {
        self.width.saturating_sub(self.sidebar_width)
    }

    fn pane_width(&self) -> u32 {
        self.content_width() / pane_count_u32(self.pane_count)
    }

    fn clamp_pane(&self, pane: PaneIndex) -> u32 {
        let last = pane_count_u32(self.pane_count) - 1;
        u32::try_from(pane.value()).unwrap_or(u32::MAX).min(last)
    }
}

fn pane_count_u32(count: PaneCount) -> u32 {
    u32::try_from(count.get()).unwrap_or(1)
}

fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl BoundsResolver for SplitLayout {
    fn pane_bounds(&self, pane: PaneIndex) -> Rect {
        let slot = self.clamp_pane(pane);
        let pane_width = self.pane_width();
        let x = self.sidebar_width + slot * pane_width;
        // Last pane absorbs the rounding remainder.
        let width = if slot + 1 == pane_count_u32(self.pane_count) {
            self.width.saturating_sub(x)
        } else {
            pane_width
        };
        Rect::new(to_coord(x), 0, width, self.height)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn quick_prompt_bounds(&self, height: f64, anchor: PaneIndex) -> Rect {
        let pane = self.pane_bounds(anchor);
        let width = pane
            .width
            .saturating_sub(OVERLAY_SIDE_MARGIN * 2)
            .min(OVERLAY_MAX_WIDTH);
        let max_height = self.height.saturating_sub(OVERLAY_BOTTOM_MARGIN * 2);
        let height = if height.is_finite() && height > 0.0 {
            (height.round() as u32).min(max_height)
        } else {
            0
        };
        let x = pane.x + to_coord((pane.width - width) / 2);
        let y = to_coord(self.height.saturating_sub(height + OVERLAY_BOTTOM_MARGIN));
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(count: usize) -> SplitLayout {
        SplitLayout::new(
            WindowSettings {
                width: 1064,
                height: 800,
                sidebar_width: 64,
            },
            PaneCount::new(count).unwrap(),
        )
    }

    #[test]
    fn panes_split_content_area() {
        let layout = layout(3);
        assert_eq!(layout.pane_bounds(PaneIndex::new(0)), Rect::new(64, 0, 333, 800));
        assert_eq!(layout.pane_bounds(PaneIndex::new(1)), Rect::new(397, 0, 333, 800));
        // 1000 / 3 leaves a remainder for the last pane.
        assert_eq!(layout.pane_bounds(PaneIndex::new(2)), Rect::new(730, 0, 334, 800));
    }

    #[test]
    fn out_of_range_pane_maps_to_last() {
        let layout = layout(2);
        assert_eq!(
            layout.pane_bounds(PaneIndex::new(3)),
            layout.pane_bounds(PaneIndex::new(1))
        );
    }

    #[test]
    fn quick_prompt_is_centered_over_anchor() {
        let layout = layout(1);
        let rect = layout.quick_prompt_bounds(72.0, PaneIndex::new(0));
        assert_eq!(rect.width, 720);
        assert_eq!(rect.height, 72);
        assert_eq!(rect.x, 64 + (1000 - 720) / 2);
        assert_eq!(rect.y, 800 - 72 - 24);
    }

    #[test]
    fn quick_prompt_height_is_bounded_by_window() {
        let layout = layout(2);
        let rect = layout.quick_prompt_bounds(5000.0, PaneIndex::new(1));
        assert_eq!(rect.height, 800 - 48);
        assert_eq!(rect.y, 24);
        assert_eq!(rect.width, 500 - 48);
    }
}
