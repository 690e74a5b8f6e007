//! Shared infrastructure utilities for Chorus.
//!
//! This crate provides cross-cutting helpers that the engine and the binary
//! need but that don't belong in the domain-pure `chorus-types` crate:
//!
//! - **`url_equiv`**: Origin and navigation-target equivalence for URLs
//! - **`html`**: Markup escaping and `data:` URL encoding for generated pages
//! - **`user_agent`**: Stripping host-application tokens from user agent strings

pub mod html;
pub mod url_equiv;
pub mod user_agent;

pub use html::{HTML_DATA_URL_PREFIX, encode_html_data_url, escape_html, json_string_literal};
pub use url_equiv::{is_same_origin, urls_equivalent};
pub use user_agent::UserAgentSanitizer;
