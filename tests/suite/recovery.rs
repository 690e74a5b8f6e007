//! Load failure recovery across the whole engine: retry scheduling, backoff,
//! the fallback page and the cases that must be left alone.

use chorus_engine::ERR_ABORTED;
use chorus_host::BrowserHost;
use chorus_types::{PaneCount, ViewId};

use crate::common::Harness;

const GROK_HOME: &str = "https://grok.com/";

/// Switch pane 0 to grok and hand back its view with a clean call log.
fn grok_pane(h: &mut Harness) -> ViewId {
    assert!(h.app.update_pane_provider(0, "grok").success);
    let view = h.view(0);
    h.app.host_mut().take_calls();
    view
}

#[test]
fn grok_retries_with_linear_backoff_then_shows_error_page() {
    let mut h = Harness::with_recovery(2, 100);
    let view = grok_pane(&mut h);

    h.fail(view, -105);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 1);
    assert_eq!(h.advance_ms(99), 0);
    assert_eq!(h.advance_ms(1), 1);
    assert_eq!(h.app.host().loads_for(view), [GROK_HOME]);

    h.fail(view, -105);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 2);
    assert_eq!(h.advance_ms(199), 0);
    assert_eq!(h.advance_ms(1), 1);
    assert_eq!(h.app.host().loads_for(view), [GROK_HOME, GROK_HOME]);

    h.fail(view, -105);
    let state = h.app.recovery_state(view).unwrap();
    assert_eq!(state.attempt_count, 3);
    assert_eq!(state.target_url, GROK_HOME);
    assert_eq!(h.app.pending_timers(), 0);

    let loads = h.app.host().loads_for(view);
    assert_eq!(loads.len(), 3);
    let error_page = &loads[2];
    assert!(error_page.starts_with("data:text/html;charset=utf-8,"));
    assert!(error_page.contains("Grok%20failed%20to%20load"));
    assert!(error_page.contains("Retry%20attempts%3A%203"));
    assert!(error_page.contains("Error%20code%3A%20-105"));
}

#[test]
fn successful_reload_resets_attempts() {
    let mut h = Harness::with_recovery(2, 100);
    let view = grok_pane(&mut h);

    h.fail(view, -105);
    h.advance_ms(100);
    h.finish(view);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 0);

    // The budget starts over.
    h.fail(view, -105);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 1);
    assert_eq!(h.app.pending_timers(), 1);
}

#[test]
fn zero_retry_budget_goes_straight_to_error_page() {
    let mut h = Harness::with_recovery(0, 100);
    let view = grok_pane(&mut h);

    h.fail(view, -106);
    assert_eq!(h.app.pending_timers(), 0);
    let loads = h.app.host().loads_for(view);
    assert_eq!(loads.len(), 1);
    assert!(loads[0].contains("Retry%20attempts%3A%201"));
}

#[test]
fn aborted_and_cross_origin_failures_are_ignored() {
    let mut h = Harness::new();
    let view = h.view(0);

    h.fail(view, ERR_ABORTED);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 0);

    h.app
        .host_mut()
        .navigate_in_page(view, "https://auth.openai.com/log-in");
    h.fail(view, -105);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 0);
    assert_eq!(h.app.pending_timers(), 0);
    assert!(h.app.host().loads_for(view).is_empty());
}

#[test]
fn renderer_crash_counts_as_failure() {
    let mut h = Harness::with_recovery(1, 100);
    let view = h.view(1);

    let event = h.app.host_mut().crash(view, "oom");
    h.app.handle_host_event(event);
    assert_eq!(h.app.recovery_state(view).unwrap().attempt_count, 1);
    h.advance_ms(100);
    assert_eq!(h.app.host().loads_for(view), ["https://claude.ai/new"]);

    let event = h.app.host_mut().crash(view, "oom");
    h.app.handle_host_event(event);
    let loads = h.app.host().loads_for(view);
    assert_eq!(loads.len(), 2);
    assert!(loads[1].contains("Render%20process%20gone%3A%20oom"));
    assert!(loads[1].contains("Error%20code%3A%20-1000"));
}

#[test]
fn retry_for_removed_pane_is_dropped() {
    let mut h = Harness::with_recovery(2, 100);
    let view = h.view(2);

    h.fail(view, -105);
    assert_eq!(h.app.pending_timers(), 1);
    h.app.set_pane_count(PaneCount::new(2).unwrap());
    assert!(h.app.host().is_destroyed(view));

    assert_eq!(h.advance_ms(100), 1);
    assert!(h.app.host().loads_for(view).is_empty());
}

#[test]
fn closing_stale_view_drops_its_queued_retry() {
    let mut h = Harness::with_recovery(2, 100);
    let view = h.view(0);
    h.app
        .host_mut()
        .navigate_in_page(view, "https://chatgpt.com/c/42");
    h.finish(view);

    h.fail(view, -105);
    assert_eq!(h.app.pending_timers(), 1);

    // Switching away and back to the deep-linked provider rebuilds the view;
    // the old one is closed and its queued retry must not fire.
    assert!(h.app.update_pane_provider(0, "claude").success);
    assert!(h.app.update_pane_provider(0, "chatgpt").success);
    assert!(h.app.host().is_destroyed(view));
    h.app.host_mut().take_calls();

    h.advance_ms(100);
    assert!(h.app.host().loads_for(view).is_empty());
}
