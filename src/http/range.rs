//! Byte-range request parsing.
//!
//! Implements a restricted subset of the Range grammar: exactly
//! `bytes=<start>-<end?>` or `bytes=-<suffix>`. Anything else, including
//! multiple ranges, is invalid and answered with 416 by the engine rather
//! than ignored.

/// A validated half-open byte range over the uncompressed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Exclusive end; always `start < end <= size`.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Outcome of inspecting the `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDirective {
    /// No Range header; the request proceeds to conditional handling.
    Absent,
    /// Present but unparseable or unsatisfiable: 416.
    Invalid,
    /// Present and valid: 206 over this slice.
    Slice(ByteRange),
}

/// Parse and validate the `Range` header against the uncompressed size.
///
/// The suffix form `bytes=-<n>` resolves to the last `n` bytes. A resolved
/// range must satisfy `0 <= start < end <= size`; any violation, a suffix
/// longer than the content, or a syntactically foreign header (other units,
/// multiple ranges, junk) all collapse to `Invalid`.
#[must_use]
pub fn parse_range(header: Option<&str>, size: u64) -> RangeDirective {
    let Some(header) = header else {
        return RangeDirective::Absent;
    };
    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeDirective::Invalid;
    };

    let resolved = if let Some(suffix) = spec.strip_prefix('-') {
        resolve_suffix(suffix, size)
    } else {
        resolve_span(spec, size)
    };

    match resolved {
        Some(range) if range.start < range.end && range.end <= size => {
            RangeDirective::Slice(range)
        }
        _ => RangeDirective::Invalid,
    }
}

/// `-<n>`: the last `n` bytes.
fn resolve_suffix(suffix: &str, size: u64) -> Option<ByteRange> {
    let n: u64 = suffix.parse().ok()?;
    let start = size.checked_sub(n)?;
    Some(ByteRange { start, end: size })
}

/// `<start>-<end?>`: an absolute span, inclusive end when given.
fn resolve_span(spec: &str, size: u64) -> Option<ByteRange> {
    let (start_str, end_str) = spec.split_once('-')?;
    let start: u64 = start_str.parse().ok()?;
    let end = if end_str.is_empty() {
        size
    } else {
        end_str.parse::<u64>().ok()?.checked_add(1)?
    };
    Some(ByteRange { start, end })
}
