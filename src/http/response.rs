//! HTTP response builders.
//!
//! One builder per status the engine and its host produce, decoupled from the
//! decision logic. Builder failures cannot happen with well-formed header
//! values; the fallback path logs and degrades instead of panicking.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::logger;
use crate::manifest::Validators;

use super::range::ByteRange;

/// Build the final 200 for a resolved asset.
///
/// `body` is whichever variant was negotiated; `Content-Length` is always
/// that variant's own size while `Content-Type` stays the original asset's
/// media type. HEAD suppresses the body, never the headers.
pub fn build_asset_response(
    body: Bytes,
    content_type: &str,
    validators: &Validators,
    encoding: Option<&'static str>,
    cache_control: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", validators.etag.as_str())
        .header("Last-Modified", validators.last_modified.as_str())
        .header("Accept-Ranges", "bytes")
        .header("Cache-Control", cache_control);
    if let Some(encoding) = encoding {
        builder = builder.header("Content-Encoding", encoding);
    }
    let body = if is_head { Bytes::new() } else { body };
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a 206 over the uncompressed source. Range responses carry no
/// Content-Encoding and no Cache-Control.
pub fn build_partial_response(
    body: Bytes,
    content_type: &str,
    validators: &Validators,
    range: ByteRange,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { body };
    Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header(
            "Content-Range",
            format!("bytes {}-{}/{}", range.start, range.end - 1, validators.size),
        )
        .header("Accept-Ranges", "bytes")
        .header("ETag", validators.etag.as_str())
        .header("Last-Modified", validators.last_modified.as_str())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 304 with the record's descriptive headers and an empty body.
pub fn build_not_modified_response(
    content_type: &str,
    validators: &Validators,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .header("Content-Type", content_type)
        .header("ETag", validators.etag.as_str())
        .header("Last-Modified", validators.last_modified.as_str())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 416 for an unparseable or unsatisfiable range.
pub fn build_not_satisfiable_response(size: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Range", format!("bytes */{size}"))
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 302 to the opposite trailing-slash form of a soft miss.
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(302)
        .header("Location", location)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build the host's 404 for paths no handler claimed.
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build the host's 405 for methods the static engine never serves.
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build the host's 500 for a byte-source read that failed at serve time.
pub fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("500 Internal Server Error")))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from("500 Internal Server Error")))
        })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
