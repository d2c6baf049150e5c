//! Lazy fragment streams for source emission.
//!
//! Generated manifest source is assembled from composable chunk iterators and
//! consumed exactly once by a writer. Nesting combinators never realize a
//! whole-string buffer per record, so very large manifests stream out without
//! quadratic copying.

use std::borrow::Cow;
use std::io::{self, Write};

type Chunk = Cow<'static, str>;

/// A lazily produced stream of text chunks.
pub struct Frag(Box<dyn Iterator<Item = Chunk>>);

impl Frag {
    /// A single static chunk.
    #[must_use]
    pub fn lit(s: &'static str) -> Self {
        Self(Box::new(std::iter::once(Chunk::Borrowed(s))))
    }

    /// A single owned chunk.
    #[must_use]
    pub fn owned(s: String) -> Self {
        Self(Box::new(std::iter::once(Chunk::Owned(s))))
    }

    /// A double-quoted string literal with escapes.
    #[must_use]
    pub fn quoted(s: &str) -> Self {
        Self::owned(quote(s))
    }

    /// Concatenate fragments in order.
    #[must_use]
    pub fn concat(parts: Vec<Self>) -> Self {
        Self(Box::new(parts.into_iter().flat_map(|frag| frag.0)))
    }

    /// Interleave fragments with a separator.
    #[must_use]
    pub fn join(items: Vec<Self>, separator: &'static str) -> Self {
        Self(Box::new(items.into_iter().enumerate().flat_map(
            move |(i, frag)| {
                let sep = (i > 0).then_some(Chunk::Borrowed(separator));
                sep.into_iter().chain(frag.0)
            },
        )))
    }

    /// Add one level (two spaces) of indentation after every newline.
    #[must_use]
    pub fn indent(self) -> Self {
        Self(Box::new(self.0.map(|chunk| {
            if chunk.contains('\n') {
                Chunk::Owned(chunk.replace('\n', "\n  "))
            } else {
                chunk
            }
        })))
    }

    /// Stream into a writer, consuming the fragment.
    pub fn write_to<W: Write>(self, writer: &mut W) -> io::Result<()> {
        for chunk in self.0 {
            writer.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }

    /// Realize the whole stream as one string.
    #[must_use]
    pub fn collect(self) -> String {
        self.0.collect()
    }
}

/// Escape a string into a double-quoted literal.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
