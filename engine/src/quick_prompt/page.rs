//! The overlay document.
//!
//! The page is a fixed template plus one JSON config object. Everything the
//! page needs from the engine (heights, event names, debug tag) travels in
//! [`QuickPromptPageConfig`]; the engine talks back to the page only through
//! the two dispatch scripts below.

use chorus_config::QuickPromptSettings;
use chorus_utils::encode_html_data_url;
use serde::Serialize;

/// Event the page listens for to reset its draft and take focus.
pub const QUICK_PROMPT_OPENED_EVENT: &str = "chorus:quick-prompt-opened";
/// Event the page listens for to send its current draft.
pub const QUICK_PROMPT_SUBMIT_EVENT: &str = "chorus:quick-prompt-submit";
/// Console messages containing this tag are relayed to the engine log.
pub const QUICK_PROMPT_DEBUG_TAG: &str = "[quick-prompt-debug]";

const PLACEHOLDER: &str = "Ask every pane\u{2026}";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPromptPageConfig {
    pub default_height: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub debug_tag: String,
    pub opened_event: String,
    pub submit_event: String,
    pub placeholder: String,
}

impl QuickPromptPageConfig {
    #[must_use]
    pub fn from_settings(settings: &QuickPromptSettings) -> Self {
        Self {
            default_height: settings.default_height,
            min_height: settings.min_height,
            max_height: settings.max_height,
            debug_tag: QUICK_PROMPT_DEBUG_TAG.to_string(),
            opened_event: QUICK_PROMPT_OPENED_EVENT.to_string(),
            submit_event: QUICK_PROMPT_SUBMIT_EVENT.to_string(),
            placeholder: PLACEHOLDER.to_string(),
        }
    }
}

pub const QUICK_PROMPT_OPENED_SCRIPT: &str =
    "window.dispatchEvent(new CustomEvent(\"chorus:quick-prompt-opened\"));";
pub const QUICK_PROMPT_SUBMIT_SCRIPT: &str =
    "window.dispatchEvent(new CustomEvent(\"chorus:quick-prompt-submit\"));";

const STYLE: &str = "\
html,body{margin:0;background:transparent;overflow:hidden;font-family:system-ui,-apple-system,'Segoe UI',sans-serif}\
form{box-sizing:border-box;margin:0;padding:12px 14px;border-radius:14px;background:Canvas;color:CanvasText;box-shadow:0 8px 28px rgba(0,0,0,.28)}\
textarea{box-sizing:border-box;width:100%;border:0;outline:0;resize:none;background:transparent;color:inherit;font:inherit;font-size:15px;line-height:1.4}";

const SCRIPT: &str = r"
const config = JSON.parse(document.getElementById('chorus-config').textContent);
const input = document.getElementById('prompt');
input.placeholder = config.placeholder;
const debug = (...parts) => console.debug(config.debugTag, ...parts);
const clamp = (h) => Math.min(config.maxHeight, Math.max(config.minHeight, h));
const fit = () => {
  input.style.height = 'auto';
  const height = clamp(input.scrollHeight + 24);
  if (window.chorusQuickPrompt && window.chorusQuickPrompt.resize) {
    window.chorusQuickPrompt.resize(height);
  }
};
input.addEventListener('input', fit);
window.addEventListener(config.openedEvent, () => {
  input.value = '';
  fit();
  input.focus();
  debug('opened');
});
window.addEventListener(config.submitEvent, () => {
  const text = input.value.trim();
  if (!text) {
    debug('submit ignored: empty draft');
    return;
  }
  if (window.chorusQuickPrompt && window.chorusQuickPrompt.submit) {
    window.chorusQuickPrompt.submit(text);
  }
  debug('submitted', text.length);
  input.value = '';
  fit();
});
";

/// Render the overlay document with `config` embedded as JSON.
#[must_use]
pub fn render_quick_prompt_html(config: &QuickPromptPageConfig) -> String {
    // The config sits in a script element; keep it from closing that element.
    let json = serde_json::to_string(config)
        .unwrap_or_else(|_| String::from("{}"))
        .replace("</", "<\\/");
    format!(
        "<!doctype html>\
<html lang=\"en\"><head><meta charset=\"utf-8\">\
<style>{STYLE}</style></head>\
<body><form onsubmit=\"return false\"><textarea id=\"prompt\" rows=\"1\" autofocus></textarea></form>\
<script id=\"chorus-config\" type=\"application/json\">{json}</script>\
<script>{SCRIPT}</script>\
</body></html>"
    )
}

#[must_use]
pub fn build_quick_prompt_data_url(config: &QuickPromptPageConfig) -> String {
    encode_html_data_url(&render_quick_prompt_html(config))
}
