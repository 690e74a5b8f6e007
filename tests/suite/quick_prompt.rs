//! Quick prompt overlay driven through the engine facade.

use chorus_engine::{HideOptions, QUICK_PROMPT_OPENED_SCRIPT, QUICK_PROMPT_SUBMIT_SCRIPT};
use chorus_host::{BrowserHost, HostCall, InputDisposition, KeyInput, ViewRole};
use chorus_types::{PaneCount, PaneIndex, Rect};

use crate::common::Harness;

fn opened_signals(h: &Harness) -> usize {
    let overlay = h.overlay();
    h.app
        .host()
        .calls()
        .iter()
        .filter(|call| {
            matches!(call, HostCall::ExecuteScript { view, script }
                if *view == overlay && script == QUICK_PROMPT_OPENED_SCRIPT)
        })
        .count()
}

fn contains(outer: Rect, inner: Rect) -> bool {
    inner.x >= outer.x && inner.x + inner.width as i32 <= outer.x + outer.width as i32
}

#[test]
fn shows_over_focused_pane_on_top_of_everything() {
    let mut h = Harness::new();
    h.focus(h.view(1));

    assert!(h.app.show_quick_prompt());
    let overlay = h.overlay();
    assert_eq!(h.app.host().role_of(overlay), Some(ViewRole::QuickPrompt));
    assert_eq!(h.app.host().content_tree().last(), Some(&overlay));
    assert!(h.app.host().is_focused(overlay));
    assert_eq!(h.app.host().loads_for(overlay), [h.app.quick_prompt().page_url()]);

    let pane = h.app.host().bounds_of(h.view(1)).unwrap();
    let bounds = h.app.host().bounds_of(overlay).unwrap();
    assert!(contains(pane, bounds));
    assert_eq!(bounds.height, 72);
    assert_eq!(bounds.y + 72 + 24, 900);
}

#[test]
fn opened_signal_waits_for_page_ready() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    assert_eq!(opened_signals(&h), 0);

    h.finish(h.overlay());
    assert!(h.app.quick_prompt().is_ready());
    assert_eq!(opened_signals(&h), 1);

    // Later loads of the same page do not re-announce.
    h.finish(h.overlay());
    assert_eq!(opened_signals(&h), 1);

    h.app.hide_quick_prompt(HideOptions::default());
    h.app.show_quick_prompt();
    assert_eq!(opened_signals(&h), 2);
}

#[test]
fn plain_enter_submits_and_shift_enter_types() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let overlay = h.overlay();

    let enter = KeyInput::key_down("Enter", "Enter");
    assert_eq!(h.app.handle_before_input(overlay, &enter), InputDisposition::Consumed);
    assert!(h.app.host().calls().contains(&HostCall::ExecuteScript {
        view: overlay,
        script: QUICK_PROMPT_SUBMIT_SCRIPT.to_string(),
    }));

    let newline = KeyInput::key_down("Enter", "Enter").with_shift();
    assert_eq!(h.app.handle_before_input(overlay, &newline), InputDisposition::Forward);
    let numpad = KeyInput::key_down("Enter", "NumpadEnter");
    assert_eq!(h.app.handle_before_input(overlay, &numpad), InputDisposition::Consumed);

    // Pane views never get their Enter intercepted.
    assert_eq!(h.app.handle_before_input(h.view(0), &enter), InputDisposition::Forward);
}

#[test]
fn blur_hides_after_short_delay_without_stealing_focus() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let overlay = h.overlay();
    h.app.host_mut().take_calls();

    h.blur(overlay);
    assert_eq!(h.app.pending_timers(), 1);
    assert_eq!(h.advance_ms(79), 0);
    assert!(h.app.quick_prompt().is_visible());

    assert_eq!(h.advance_ms(1), 1);
    assert!(!h.app.quick_prompt().is_visible());
    assert!(!h.app.host().is_attached(overlay));
    assert!(!h.app.host().calls().contains(&HostCall::FocusControlSurface));
    assert!(!h.app.host().is_destroyed(overlay), "hidden, not destroyed");
}

#[test]
fn refocus_before_deadline_cancels_auto_hide() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let overlay = h.overlay();

    h.blur(overlay);
    h.focus(overlay);
    assert_eq!(h.advance_ms(80), 1);
    assert!(h.app.quick_prompt().is_visible());
}

#[test]
fn toggle_round_trip_restores_control_surface_focus() {
    let mut h = Harness::new();
    assert!(h.app.toggle_quick_prompt());
    assert!(!h.app.toggle_quick_prompt());
    assert!(h.app.host().control_surface_focused());

    // Reopen reuses the same view.
    let overlay = h.overlay();
    assert!(h.app.toggle_quick_prompt());
    assert_eq!(h.overlay(), overlay);
}

#[test]
fn resize_is_clamped_and_ignores_garbage() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let overlay = h.overlay();

    assert_eq!(h.app.resize_quick_prompt(1000.0), (true, 360.0));
    assert_eq!(h.app.host().bounds_of(overlay).unwrap().height, 360);
    assert_eq!(h.app.resize_quick_prompt(10.0), (true, 72.0));
    assert_eq!(h.app.resize_quick_prompt(f64::NAN), (true, 72.0));
    assert_eq!(h.app.resize_quick_prompt(150.4), (true, 150.4));
    assert_eq!(h.app.host().bounds_of(overlay).unwrap().height, 150);
}

#[test]
fn overlay_follows_anchor_when_panes_shrink() {
    let mut h = Harness::new();
    h.focus(h.view(2));
    h.app.show_quick_prompt();
    let overlay = h.overlay();

    h.app.set_pane_count(PaneCount::new(2).unwrap());
    assert_eq!(h.app.quick_prompt_anchor(), PaneIndex::new(1));
    let pane = h.app.host().bounds_of(h.view(1)).unwrap();
    assert!(contains(pane, h.app.host().bounds_of(overlay).unwrap()));
    assert_eq!(h.app.host().content_tree().last(), Some(&overlay));
}

#[test]
fn explicit_anchor_moves_visible_overlay() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let overlay = h.overlay();

    assert!(h.app.set_quick_prompt_anchor(2.0));
    let pane = h.app.host().bounds_of(h.view(2)).unwrap();
    assert!(contains(pane, h.app.host().bounds_of(overlay).unwrap()));

    assert!(!h.app.set_quick_prompt_anchor(f64::INFINITY));
    assert_eq!(h.app.quick_prompt_anchor(), PaneIndex::new(2));
}

#[test]
fn crashed_overlay_is_discarded_and_rebuilt_on_next_show() {
    let mut h = Harness::new();
    h.app.show_quick_prompt();
    let first = h.overlay();

    let event = h.app.host_mut().crash(first, "crashed");
    h.app.handle_host_event(event);
    assert!(h.app.quick_prompt().view().is_none());
    assert!(!h.app.quick_prompt().is_visible());
    assert!(h.app.host().is_destroyed(first));
    assert!(h.app.recovery_state(first).is_none());

    assert!(h.app.show_quick_prompt());
    assert_ne!(h.overlay(), first);
}
