//! Glob-style exclusion patterns for the client file scan.
//!
//! Supports the subset the builder needs: `*` (within a path segment), `**`
//! (across segments) and `?` (single character). Everything else is literal.

use regex::Regex;

/// A compiled ignore pattern, matched against normalized relative paths.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern. Fails only on a pattern the regex engine
    /// rejects after translation, which no supported glob produces.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(pattern))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Test a `/`-separated relative path against the whole pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Translate a glob into an anchored regex.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}
