//! Pathname normalization and manifest lookup.
//!
//! The lookup order mirrors how the manifest is laid out: exact pathname,
//! then the extension/index fallbacks, then the opposite trailing-slash form
//! (a soft miss, resolved with a redirect instead of direct service).

use crate::manifest::{AssetRecord, Manifest};

/// Result of resolving a request path against the manifest.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// Serve this record.
    Hit(&'a AssetRecord),
    /// The opposite trailing-slash form exists: 302 to it.
    Redirect(String),
    /// Not a static path; defer to the next handler.
    Miss,
}

/// Resolve `.` and `..` segments and collapse duplicate slashes, keeping a
/// meaningful trailing slash. Always returns a path with one leading `/`.
#[must_use]
pub fn normalize_pathname(raw: &str) -> String {
    let trailing = raw.len() > 1 && raw.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let mut out = String::with_capacity(raw.len());
    out.push('/');
    out.push_str(&segments.join("/"));
    if trailing && out.len() > 1 {
        out.push('/');
    }
    out
}

/// Look up a normalized pathname.
#[must_use]
pub fn lookup<'a>(manifest: &'a Manifest, pathname: &str) -> Lookup<'a> {
    if let Some(record) = manifest.get(pathname) {
        return Lookup::Hit(record);
    }

    let candidates: Vec<String> = if pathname == "/" {
        vec!["/index.html".to_string(), "/index.htm".to_string()]
    } else {
        let stripped = pathname.strip_suffix('/').unwrap_or(pathname);
        vec![
            format!("{stripped}.html"),
            format!("{stripped}.htm"),
            format!("{stripped}/index.html"),
            format!("{stripped}/index.htm"),
        ]
    };
    for candidate in &candidates {
        if let Some(record) = manifest.get(candidate) {
            return Lookup::Hit(record);
        }
    }

    let flipped = pathname
        .strip_suffix('/')
        .map_or_else(|| format!("{pathname}/"), String::from);
    if manifest.contains(&flipped) {
        return Lookup::Redirect(flipped);
    }

    Lookup::Miss
}
