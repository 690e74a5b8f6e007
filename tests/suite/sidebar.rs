//! Loading indicator notifications sent to the control surface.

use chorus_types::{PaneCount, PaneIndex};

use crate::common::{Harness, loading_notifications};

#[test]
fn switch_shows_indicator_until_page_stops_loading() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(1, "grok").success);
    let grok = h.view(1);
    assert!(h.app.is_pane_loading(PaneIndex::new(1)));
    assert_eq!(loading_notifications(h.app.host()), [(1, true)]);

    // Subresources stopping while the main frame is still loading do not count.
    h.stop(grok);
    assert!(h.app.is_pane_loading(PaneIndex::new(1)));

    h.finish(grok);
    h.stop(grok);
    assert!(!h.app.is_pane_loading(PaneIndex::new(1)));
    assert_eq!(loading_notifications(h.app.host()), [(1, true), (1, false)]);

    // Later stop signals for the same view are not tracked any more.
    h.stop(grok);
    assert_eq!(loading_notifications(h.app.host()).len(), 2);
}

#[test]
fn reusing_a_cached_view_clears_the_indicator_immediately() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(0, "claude").success);
    h.app.host_mut().take_calls();

    assert!(h.app.update_pane_provider(0, "chatgpt").success);
    assert!(!h.app.is_pane_loading(PaneIndex::new(0)));
    assert_eq!(loading_notifications(h.app.host()), [(0, false)]);
}

#[test]
fn superseded_switch_does_not_clear_newer_indicator() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(2, "grok").success);
    let grok = h.view(2);
    assert!(h.app.update_pane_provider(2, "perplexity").success);
    let perplexity = h.view(2);
    h.app.host_mut().take_calls();

    // The detached grok view finishing must not end perplexity's indicator.
    h.finish(grok);
    h.stop(grok);
    assert!(h.app.is_pane_loading(PaneIndex::new(2)));
    assert!(loading_notifications(h.app.host()).is_empty());

    h.finish(perplexity);
    h.stop(perplexity);
    assert_eq!(loading_notifications(h.app.host()), [(2, false)]);
}

#[test]
fn retry_in_flight_keeps_indicator_until_error_page_settles() {
    let mut h = Harness::with_recovery(0, 100);
    assert!(h.app.update_pane_provider(0, "grok").success);
    let grok = h.view(0);

    // The error page load is already running when the failure is reported.
    h.fail(grok, -105);
    assert!(h.app.is_pane_loading(PaneIndex::new(0)));

    h.finish(grok);
    h.stop(grok);
    assert!(!h.app.is_pane_loading(PaneIndex::new(0)));
}

#[test]
fn failure_with_idle_main_frame_clears_indicator() {
    let mut h = Harness::with_recovery(2, 100);
    assert!(h.app.update_pane_provider(0, "grok").success);
    let grok = h.view(0);

    h.fail(grok, -105);
    assert_eq!(h.app.pending_timers(), 1);
    assert!(!h.app.is_pane_loading(PaneIndex::new(0)));
}

#[test]
fn removing_a_pane_turns_its_indicator_off_once() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(2, "grok").success);
    h.app.host_mut().take_calls();

    h.app
        .set_pane_count(PaneCount::new(2).unwrap());
    assert_eq!(loading_notifications(h.app.host()), [(2, false)]);
}

#[test]
fn unavailable_control_surface_does_not_block_switching() {
    let mut h = Harness::new();
    h.app.host_mut().refuse_control_scripts(true);

    assert!(h.app.update_pane_provider(1, "gemini").success);
    assert!(h.app.is_pane_loading(PaneIndex::new(1)));
    assert!(loading_notifications(h.app.host()).is_empty());
}
