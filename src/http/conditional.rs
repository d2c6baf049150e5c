//! Conditional request evaluation against stored validators.
//!
//! Both checks are exact string comparisons. `If-None-Match` must equal the
//! recorded quoted etag; `If-Modified-Since` must equal the recorded
//! HTTP-date literally rather than as a parsed timestamp. The literal date
//! comparison under-matches clients that reformat the date; that behavior is
//! kept deliberately (see DESIGN.md).

use crate::manifest::Validators;

/// What a conditional GET/HEAD should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// A validator matched: respond 304 with an empty body.
    NotModified,
    /// No validator matched: serve the full response.
    Stale,
}

/// Evaluate `If-None-Match` then `If-Modified-Since` against the record's
/// validators. `If-None-Match` wins when both are present.
#[must_use]
pub fn check(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    validators: &Validators,
) -> Freshness {
    if if_none_match.is_some_and(|etag| etag == validators.etag) {
        return Freshness::NotModified;
    }
    if if_modified_since.is_some_and(|date| date == validators.last_modified) {
        return Freshness::NotModified;
    }
    Freshness::Stale
}
