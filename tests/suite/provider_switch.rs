//! Switching a pane's provider, cached view reuse, and reset-all.

use std::cell::RefCell;
use std::rc::Rc;

use chorus_host::{BrowserHost, HostCall, HostError};
use chorus_types::{PaneIndex, ViewId};

use crate::common::{Harness, created_views};

#[test]
fn switching_back_reuses_the_cached_home_view() {
    let mut h = Harness::new();
    let chatgpt = h.view(0);
    h.finish(chatgpt);

    assert!(h.app.update_pane_provider(0, "claude").success);
    let claude = h.view(0);
    assert_ne!(claude, chatgpt);
    assert!(!h.app.host().is_attached(chatgpt));
    assert!(!h.app.host().is_destroyed(chatgpt));
    h.app.host_mut().take_calls();

    h.focus(h.view(2));
    assert!(h.app.update_pane_provider(0, "ChatGPT").success);
    assert_eq!(h.view(0), chatgpt);
    assert_eq!(created_views(h.app.host()), 0);
    assert!(h.app.host().loads_for(chatgpt).is_empty());
    assert!(h.app.host().is_attached(chatgpt));
    assert!(!h.app.host().is_attached(claude));
    assert_eq!(h.app.quick_prompt_anchor(), PaneIndex::new(0));
    assert_eq!(h.app.panes().pane(0).unwrap().provider_key.as_str(), "chatgpt");
}

#[test]
fn deep_linked_cached_view_is_replaced() {
    let mut h = Harness::new();
    let chatgpt = h.view(0);
    h.app
        .host_mut()
        .navigate_in_page(chatgpt, "https://chatgpt.com/c/42");
    h.finish(chatgpt);
    assert_eq!(h.app.panes().pane(0).unwrap().url, "https://chatgpt.com/c/42");

    assert!(h.app.update_pane_provider(0, "claude").success);
    assert!(h.app.update_pane_provider(0, "chatgpt").success);

    let fresh = h.view(0);
    assert_ne!(fresh, chatgpt);
    assert!(h.app.host().is_destroyed(chatgpt));
    assert_eq!(h.app.host().loads_for(fresh), ["https://chatgpt.com/"]);
    assert_eq!(
        h.app.recovery_state(fresh).unwrap().target_url,
        "https://chatgpt.com/"
    );
}

#[test]
fn rejected_switches_touch_nothing() {
    let mut h = Harness::new();

    let unknown_provider = h.app.update_pane_provider(1, "copilot");
    assert!(!unknown_provider.success);
    assert_eq!(unknown_provider.pane_index, 1);

    let unknown_pane = h.app.update_pane_provider(3, "claude");
    assert!(!unknown_pane.success);
    assert_eq!(unknown_pane.pane_index, 3);

    assert!(h.app.host().calls().is_empty());
    assert_eq!(h.app.default_providers()[1].as_str(), "claude");
}

#[test]
fn failed_view_creation_keeps_current_view() {
    let mut h = Harness::new();
    let before = h.view(1);
    h.app.host_mut().refuse_view_creation(true);

    assert!(!h.app.update_pane_provider(1, "grok").success);
    assert_eq!(h.view(1), before);
    assert!(h.app.host().is_attached(before));
    assert_eq!(h.app.default_providers()[1].as_str(), "claude");
}

#[test]
fn navigation_errors_go_to_the_handler() {
    let mut h = Harness::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    h.app.set_navigation_error_handler(Box::new(move |pane: PaneIndex, view: ViewId, _err: &HostError| {
        sink.borrow_mut().push((pane, view));
    }));

    // Views are numbered in creation order; the three initial panes hold 1..=3.
    let next = ViewId::new(4);
    h.app.host_mut().refuse_loads_for(next);

    let outcome = h.app.update_pane_provider(2, "grok");
    assert!(outcome.success, "a navigation that fails to start still switches");
    assert_eq!(h.view(2), next);
    assert_eq!(*seen.borrow(), [(PaneIndex::new(2), next)]);
}

#[test]
fn reset_all_sends_every_pane_home() {
    let mut h = Harness::new();
    assert!(h.app.update_pane_provider(1, "grok").success);
    let grok = h.view(1);
    h.finish(grok);

    let gemini = h.view(2);
    let chatgpt = h.view(0);
    h.app
        .host_mut()
        .navigate_in_page(chatgpt, "https://chatgpt.com/c/7");
    h.finish(chatgpt);
    h.app.host_mut().take_calls();

    assert!(h.app.reset_all_panes_to_provider_home());

    // Deep-linked pane gets a fresh home view.
    let fresh = h.view(0);
    assert_ne!(fresh, chatgpt);
    assert_eq!(h.app.host().loads_for(fresh), ["https://chatgpt.com/"]);
    // Panes already at home are reused in place.
    assert_eq!(h.view(1), grok);
    assert_eq!(h.view(2), gemini);
    assert!(h.app.host().loads_for(grok).is_empty());
    assert!(
        !h.app
            .host()
            .calls()
            .iter()
            .any(|call| matches!(call, HostCall::Close(view) if *view == grok))
    );
}
