use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use chorus_config::ResolvedConfig;
use chorus_host::{BrowserHost, HostCall, RecordingHost};
use chorus_types::{PaneCount, PaneIndex, ProviderKey};

use super::App;
use crate::persistence::ProviderPreferenceStore;
use crate::sidebar::PANE_LOADING_EVENT;
use crate::timers::ManualClock;

#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<Vec<Vec<ProviderKey>>>>);

impl ProviderPreferenceStore for SharedStore {
    fn persist_default_providers(&mut self, providers: &[ProviderKey]) -> io::Result<()> {
        self.0.borrow_mut().push(providers.to_vec());
        Ok(())
    }
}

fn app() -> (App<RecordingHost>, ManualClock) {
    let clock = ManualClock::new();
    let app = App::new(
        RecordingHost::new(),
        ResolvedConfig::default(),
        Box::new(clock.clone()),
    );
    (app, clock)
}

fn loading_notifications(host: &RecordingHost) -> usize {
    host.calls()
        .iter()
        .filter(|call| matches!(call, HostCall::ControlScript(script) if script.contains(PANE_LOADING_EVENT)))
        .count()
}

#[test]
fn initialize_populates_configured_panes_silently() {
    let (mut app, _clock) = app();
    let outcome = app.initialize();

    assert_eq!(outcome.current_pane_count, 3);
    assert_eq!(app.pane_count(), 3);
    let providers: Vec<_> = app
        .panes()
        .panes()
        .iter()
        .map(|pane| pane.provider_key.as_str().to_string())
        .collect();
    assert_eq!(providers, ["chatgpt", "claude", "gemini"]);
    assert_eq!(loading_notifications(app.host()), 0);
    for pane in app.panes().panes() {
        assert!(app.host().is_attached(pane.view));
        assert!(app.host().bounds_of(pane.view).is_some());
    }
}

#[test]
fn successful_switch_is_persisted() {
    let (app, _clock) = app();
    let store = SharedStore::default();
    let mut app = app.with_preference_store(Box::new(store.clone()));
    app.initialize();

    assert!(app.update_pane_provider(1, "grok").success);
    assert!(!app.update_pane_provider(1, "nope").success);
    assert!(!app.update_pane_provider(7, "claude").success);

    let written = store.0.borrow();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0][1].as_str(), "grok");
}

#[test]
fn failed_load_schedules_and_fires_retry() {
    let (mut app, clock) = app();
    app.initialize();
    let view = app.panes().pane(0).unwrap().view;

    let event = app.host_mut().fail_load(view, -105, "ERR_NAME_NOT_RESOLVED");
    app.handle_host_event(event);
    assert_eq!(app.recovery_state(view).unwrap().attempt_count, 1);
    assert_eq!(app.pending_timers(), 1);

    assert_eq!(app.run_due_timers(), 0);
    clock.advance(Duration::from_millis(1000));
    assert_eq!(app.run_due_timers(), 1);
    assert_eq!(
        app.host().loads_for(view),
        vec!["https://chatgpt.com/".to_string(), "https://chatgpt.com/".to_string()]
    );
}

#[test]
fn focus_moves_anchor_and_shrink_clamps_it() {
    let (mut app, _clock) = app();
    app.initialize();
    let view = app.panes().pane(2).unwrap().view;
    let event = app.host_mut().user_focus(view);
    app.handle_host_event(event);
    assert_eq!(app.quick_prompt_anchor(), PaneIndex::new(2));

    let outcome = app.set_pane_count(PaneCount::new(2).unwrap());
    assert_eq!(outcome.quick_prompt_anchor_pane_index, PaneIndex::new(1));
    assert!(app.host().is_destroyed(view));
}

#[test]
fn anchor_requests_are_validated_and_clamped() {
    let (mut app, _clock) = app();
    app.initialize();
    assert!(!app.set_quick_prompt_anchor(-1.0));
    assert!(!app.set_quick_prompt_anchor(0.5));
    assert!(app.set_quick_prompt_anchor(9.0));
    assert_eq!(app.quick_prompt_anchor(), PaneIndex::new(2));
}

#[test]
fn visible_overlay_stays_on_top_after_switch() {
    let (mut app, _clock) = app();
    app.initialize();
    assert!(app.show_quick_prompt());
    let overlay = app.quick_prompt().view().unwrap();

    assert!(app.update_pane_provider(0, "perplexity").success);
    assert_eq!(app.host().content_tree().last(), Some(&overlay));
}

#[test]
fn overlay_events_do_not_reach_pane_supervision() {
    let (mut app, _clock) = app();
    app.initialize();
    app.show_quick_prompt();
    let overlay = app.quick_prompt().view().unwrap();

    let event = app.host_mut().fail_load(overlay, -105, "ERR_FAILED");
    app.handle_host_event(event);
    assert!(app.recovery_state(overlay).is_none());
    assert_eq!(app.pending_timers(), 0);
}

#[test]
fn shutdown_closes_everything() {
    let (mut app, _clock) = app();
    app.initialize();
    app.update_pane_provider(0, "grok");
    app.show_quick_prompt();

    app.shutdown();
    assert!(app.host().live_views().is_empty());
    assert_eq!(app.pane_count(), 0);
    assert!(!app.quick_prompt().is_visible());
}

#[test]
fn custom_notifications_reach_control_surface() {
    let (mut app, _clock) = app();
    app.notify_control_surface("chorus:prompt-sent", serde_json::json!({ "panes": 2 }));
    assert_eq!(
        app.host().calls(),
        &[HostCall::ControlScript(
            r#"window.dispatchEvent(new CustomEvent("chorus:prompt-sent", { detail: {"panes":2} }));"#
                .to_string()
        )]
    );
}
