//! User agent cleanup for embedded provider pages.
//!
//! Embedded views inherit a user agent that advertises the host application
//! (for example `Electron/33.0.0` or `Chorus/0.1.0`). Some providers degrade
//! or block such clients, so those product tokens are removed while the
//! browser-engine tokens (`Mozilla`, `AppleWebKit`, `Chrome`, `Safari`) stay.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct UserAgentSanitizer {
    pattern: Option<Regex>,
}

impl UserAgentSanitizer {
    /// Build a sanitizer that strips `<token>/<version>` products.
    ///
    /// Token matching is case-insensitive. Blank tokens are ignored.
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(&t))
            .collect();
        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let source = format!(r"(?i)(?:^|\s+)(?:{})/\S+", alternatives.join("|"));
        match Regex::new(&source) {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                tracing::warn!("User agent token pattern failed to compile ({e})");
                Self { pattern: None }
            }
        }
    }

    /// Returns the cleaned user agent. Idempotent.
    #[must_use]
    pub fn sanitize(&self, user_agent: &str) -> String {
        let stripped = match &self.pattern {
            Some(pattern) => pattern.replace_all(user_agent, ""),
            None => user_agent.into(),
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
