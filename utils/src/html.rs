//! Helpers for generated, self-contained HTML documents.
//!
//! Generated pages are delivered as `data:text/html;charset=utf-8,...` URLs.
//! Dynamic values go through exactly one encoding depending on where they
//! land: [`escape_html`] for markup text and attributes, and
//! [`json_string_literal`] for string literals inside inline scripts.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped by ECMAScript `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const HTML_DATA_URL_PREFIX: &str = "data:text/html;charset=utf-8,";

/// Escape `& < > " '` for safe interpolation into markup.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Encode a string as a JSON string literal (quotes included).
///
/// `</` is written as `<\/` so the literal cannot close an inline `<script>`.
#[must_use]
pub fn json_string_literal(raw: &str) -> String {
    serde_json::to_string(raw)
        .map(|literal| literal.replace("</", "<\\/"))
        .unwrap_or_else(|_| String::from("\"\""))
}

/// Wrap a full HTML document into a `data:` URL.
#[must_use]
pub fn encode_html_data_url(html: &str) -> String {
    let mut url = String::with_capacity(HTML_DATA_URL_PREFIX.len() + html.len() * 2);
    url.push_str(HTML_DATA_URL_PREFIX);
    url.extend(utf8_percent_encode(html, URI_COMPONENT));
    url
}
