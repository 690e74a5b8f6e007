//! Growing and shrinking the pane set.

use chorus_host::BrowserHost;
use chorus_types::{PaneCount, PaneIndex};

use crate::common::{Harness, closed_views, loading_notifications};

fn count(n: usize) -> PaneCount {
    PaneCount::new(n).unwrap()
}

#[test]
fn growing_loads_slot_defaults_silently_and_tiles_the_window() {
    let mut h = Harness::new();

    let outcome = h.app.set_pane_count(count(4));
    assert_eq!(outcome.current_pane_count, 4);

    let grok = h.view(3);
    assert_eq!(h.app.panes().pane(3).unwrap().provider_key.as_str(), "grok");
    assert_eq!(h.app.host().loads_for(grok), ["https://grok.com/"]);
    assert!(loading_notifications(h.app.host()).is_empty());

    let bounds: Vec<_> = (0..4)
        .map(|i| h.app.host().bounds_of(h.view(i)).unwrap())
        .collect();
    assert_eq!(bounds[0].x, 64);
    for pair in bounds.windows(2) {
        assert_eq!(pair[0].x + pair[0].width as i32, pair[1].x);
    }
    let last = bounds[3];
    assert_eq!(last.x + last.width as i32, 1440);
    assert!(bounds.iter().all(|b| b.height == 900));
}

#[test]
fn shrinking_closes_highest_panes_first_and_clamps_anchor() {
    let mut h = Harness::new();
    let (second, third) = (h.view(1), h.view(2));
    h.focus(third);
    assert_eq!(h.app.quick_prompt_anchor(), PaneIndex::new(2));

    let outcome = h.app.set_pane_count(count(1));
    assert_eq!(outcome.current_pane_count, 1);
    assert_eq!(outcome.quick_prompt_anchor_pane_index, PaneIndex::new(0));
    assert_eq!(closed_views(h.app.host()), [third, second]);

    // The surviving pane now spans the whole content area.
    let only = h.app.host().bounds_of(h.view(0)).unwrap();
    assert_eq!((only.x, only.width), (64, 1440 - 64));
}

#[test]
fn shrinking_closes_cached_views_too() {
    let mut h = Harness::new();
    let gemini = h.view(2);
    assert!(h.app.update_pane_provider(2, "perplexity").success);
    let perplexity = h.view(2);

    h.app.set_pane_count(count(2));
    assert!(h.app.host().is_destroyed(gemini));
    assert!(h.app.host().is_destroyed(perplexity));
}

#[test]
fn growth_stops_when_views_cannot_be_created() {
    let mut h = Harness::new();
    h.app.host_mut().refuse_view_creation(true);

    let outcome = h.app.set_pane_count(count(4));
    assert_eq!(outcome.current_pane_count, 3);
    assert_eq!(h.app.pane_count(), 3);
    // Existing panes keep the three-column layout.
    let last = h.app.host().bounds_of(h.view(2)).unwrap();
    assert_eq!(last.x + last.width as i32, 1440);
}

#[test]
fn regrown_slot_uses_last_chosen_provider() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(2, "perplexity").success);

    h.app.set_pane_count(count(2));
    h.app.set_pane_count(count(3));

    let pane = h.app.panes().pane(2).unwrap();
    assert_eq!(pane.provider_key.as_str(), "perplexity");
    assert_eq!(
        h.app.host().loads_for(pane.view),
        ["https://www.perplexity.ai/"]
    );
}

#[test]
fn window_resize_repositions_panes() {
    let mut h = Harness::new();
    h.app.relayout(1064, 700);

    let first = h.app.host().bounds_of(h.view(0)).unwrap();
    assert_eq!((first.x, first.width, first.height), (64, 333, 700));
    let last = h.app.host().bounds_of(h.view(2)).unwrap();
    assert_eq!(last.x + last.width as i32, 1064);
}
