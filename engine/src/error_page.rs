//! Fallback page shown when a pane exhausts its retries.
//!
//! The page is a self-contained HTML document delivered as a `data:` URL.
//! Markup values are HTML-escaped. The retry button's target is embedded as a
//! JSON string literal so it round-trips exactly, independent of markup
//! escaping.

use chorus_utils::{encode_html_data_url, escape_html, json_string_literal};

/// Everything the fallback page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneLoadErrorPage<'a> {
    pub provider_name: &'a str,
    pub error_code: i32,
    pub error_description: &'a str,
    pub attempt_count: u32,
    pub target_url: &'a str,
}

const STYLE: &str = "\
:root{color-scheme:light dark;font-family:system-ui,-apple-system,'Segoe UI',sans-serif}\
body{margin:0;min-height:100vh;display:flex;align-items:center;justify-content:center;background:Canvas;color:CanvasText}\
main{max-width:520px;padding:32px;text-align:left}\
h1{font-size:20px;margin:0 0 12px}\
p{margin:6px 0;line-height:1.45}\
code{word-break:break-all;opacity:.8}\
button{margin-top:18px;padding:8px 18px;border-radius:8px;border:1px solid GrayText;background:ButtonFace;color:ButtonText;font:inherit;cursor:pointer}";

#[must_use]
pub fn render_pane_load_error_html(page: &PaneLoadErrorPage<'_>) -> String {
    let title = format!("{} failed to load", escape_html(page.provider_name));
    let description = if page.error_description.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        escape_html(page.error_description)
    };
    let target = escape_html(page.target_url);
    let target_literal = json_string_literal(page.target_url);

    format!(
        "<!doctype html>\
<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>{title}</title><style>{STYLE}</style></head>\
<body><main>\
<h1>{title}</h1>\
<p>{description}</p>\
<p>Error code: {code}</p>\
<p>Retry attempts: {attempts}</p>\
<p><code>{target}</code></p>\
<button id=\"retry\" type=\"button\">Retry</button>\
</main>\
<script>\
const targetUrl = {target_literal};\
document.getElementById('retry').addEventListener('click', () => {{ window.location.href = targetUrl; }});\
</script>\
</body></html>",
        code = page.error_code,
        attempts = page.attempt_count,
    )
}

#[must_use]
pub fn build_pane_load_error_data_url(page: &PaneLoadErrorPage<'_>) -> String {
    encode_html_data_url(&render_pane_load_error_html(page))
}
