//! Media type detection from file extensions.
//!
//! The table covers what a compiled web output tree actually contains. The
//! recorded type always describes the original asset; serving a precompressed
//! sibling never changes it.

/// Map a file extension to a Content-Type.
#[must_use]
pub fn content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Documents
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // Scripts and data
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "webmanifest" | "map") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Media
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",

        // Precompressed siblings looked up directly by path
        Some("gz") => "application/gzip",
        Some("br") => "application/octet-stream",

        _ => "application/octet-stream",
    }
}
