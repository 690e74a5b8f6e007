//! URL comparison rules used to attribute navigation results to targets.
//!
//! Two flavours exist:
//!
//! - [`is_same_origin`]: scheme + host + port, as serialized by the WHATWG
//!   origin algorithm. Opaque origins (`data:`, `about:`) all serialize to
//!   `"null"` and therefore compare equal to each other.
//! - [`urls_equivalent`]: same origin, same path, same query. The fragment is
//!   ignored because in-page anchors never change what was loaded.
//!
//! Both fall back to exact string equality when either side fails to parse,
//! and report "different" when that fallback fails too.

use url::Url;

/// Returns true when both URLs share an origin.
#[must_use]
pub fn is_same_origin(left: &str, right: &str) -> bool {
    match (Url::parse(left), Url::parse(right)) {
        (Ok(l), Ok(r)) => l.origin().ascii_serialization() == r.origin().ascii_serialization(),
        _ => left == right,
    }
}

/// Returns true when both URLs address the same document (fragment ignored).
#[must_use]
pub fn urls_equivalent(left: &str, right: &str) -> bool {
    match (Url::parse(left), Url::parse(right)) {
        (Ok(l), Ok(r)) => {
            l.origin().ascii_serialization() == r.origin().ascii_serialization()
                && l.path() == r.path()
                && l.query().unwrap_or("") == r.query().unwrap_or("")
        }
        _ => left == right,
    }
}
