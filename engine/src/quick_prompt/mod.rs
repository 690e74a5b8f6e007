//! Quick prompt overlay: one floating input view above the panes.

mod anchor;
mod controller;
mod lifecycle;
mod page;

pub use anchor::AnchorTracker;
pub use controller::{
    QUICK_PROMPT_BLUR_HIDE_DELAY, QUICK_PROMPT_DEBUG_MAX_CHARS, QuickPromptContext,
    QuickPromptController, overlay_view_spec,
};
pub use lifecycle::{HideOptions, QuickPromptEnvironment, QuickPromptLifecycle};
pub use page::{
    QUICK_PROMPT_DEBUG_TAG, QUICK_PROMPT_OPENED_EVENT, QUICK_PROMPT_OPENED_SCRIPT,
    QUICK_PROMPT_SUBMIT_EVENT, QUICK_PROMPT_SUBMIT_SCRIPT, QuickPromptPageConfig,
    build_quick_prompt_data_url, render_quick_prompt_html,
};
