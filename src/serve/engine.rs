//! The static serving engine.
//!
//! A pure function of `(request, manifest)`: no mutable state, no locking,
//! arbitrarily many concurrent calls against the same immutable manifest.
//! Byte-source reads are the only await points. `Ok(None)` means "not a
//! static hit, defer to the next handler"; the engine never produces a 404.
//! A byte-source read failure propagates for the host to surface as a 5xx.

use std::io;
use std::path::{Path, PathBuf};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;

use crate::http::{self, conditional, Freshness, RangeDirective};
use crate::manifest::{ByteSource, CompressionPair, Manifest};

use super::lookup::{self, Lookup};

const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=604800, immutable";
const CACHE_CONTROL_DEFAULT: &str = "public, max-age=14400";

/// Range-aware, cache-validating, encoding-negotiating asset server.
///
/// The base directory resolves lazy byte sources; it is threaded in at
/// construction rather than read from ambient state.
pub struct StaticEngine {
    manifest: Manifest,
    base_dir: PathBuf,
}

impl StaticEngine {
    pub fn new(manifest: Manifest, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Decide whether the request is a static hit and compute its response.
    ///
    /// Decision order: method filter, lookup (with fallbacks and soft-miss
    /// redirect), range, conditional, compression, cache-control. Range
    /// handling is terminal and mutually exclusive with the conditional and
    /// compression steps.
    pub async fn serve<B>(&self, req: &Request<B>) -> io::Result<Option<Response<Full<Bytes>>>> {
        let is_head = match *req.method() {
            Method::GET => false,
            Method::HEAD => true,
            _ => return Ok(None),
        };

        let Ok(decoded) = percent_decode_str(req.uri().path()).decode_utf8() else {
            return Ok(None);
        };
        let pathname = lookup::normalize_pathname(&decoded);
        let record = match lookup::lookup(&self.manifest, &pathname) {
            Lookup::Hit(record) => record,
            Lookup::Redirect(target) => {
                let location = match req.uri().query() {
                    Some(query) => format!("{target}?{query}"),
                    None => target,
                };
                return Ok(Some(http::build_redirect_response(&location)));
            }
            Lookup::Miss => return Ok(None),
        };

        let headers = req.headers();
        let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
        let size = record.validators.size;

        // Ranges are computed over the uncompressed source and bypass both
        // conditional headers and compression.
        match http::parse_range(header("range"), size) {
            RangeDirective::Invalid => {
                return Ok(Some(http::build_not_satisfiable_response(size)));
            }
            RangeDirective::Slice(range) => {
                let body = record
                    .source
                    .read_range(&self.base_dir, range.start, range.end)
                    .await?;
                return Ok(Some(http::build_partial_response(
                    body,
                    &record.content_type,
                    &record.validators,
                    range,
                    is_head,
                )));
            }
            RangeDirective::Absent => {}
        }

        if conditional::check(
            header("if-none-match"),
            header("if-modified-since"),
            &record.validators,
        ) == Freshness::NotModified
        {
            return Ok(Some(http::build_not_modified_response(
                &record.content_type,
                &record.validators,
            )));
        }

        let (encoding, variant) = negotiate(header("accept-encoding"), &record.compression);
        let source = variant.unwrap_or(&record.source);
        let body = source.read(&self.base_dir).await?;
        let cache_control = if record.immutable {
            CACHE_CONTROL_IMMUTABLE
        } else {
            CACHE_CONTROL_DEFAULT
        };
        Ok(Some(http::build_asset_response(
            body,
            &record.content_type,
            &record.validators,
            encoding,
            cache_control,
            is_head,
        )))
    }
}

/// Pick a precompressed variant: `br` first, then `gzip`, each only when the
/// client advertised it (substring test, no q-value grammar) AND the manifest
/// recorded the sibling. Otherwise fall through to the uncompressed source.
fn negotiate<'a>(
    accept_encoding: Option<&str>,
    compression: &'a CompressionPair,
) -> (Option<&'static str>, Option<&'a ByteSource>) {
    let Some(accepted) = accept_encoding else {
        return (None, None);
    };
    if accepted.contains("br") {
        if let Some(source) = &compression.brotli {
            return (Some("br"), Some(source));
        }
    }
    if accepted.contains("gzip") {
        if let Some(source) = &compression.gzip {
            return (Some("gzip"), Some(source));
        }
    }
    (None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{AssetRecord, Validators};
    use http_body_util::BodyExt;

    fn etag_of(content: &[u8]) -> String {
        format!("\"{}\"", hex::encode(blake3::hash(content).as_bytes()))
    }

    fn record(
        content: &'static [u8],
        content_type: &str,
        immutable: bool,
        brotli: Option<&'static [u8]>,
        gzip: Option<&'static [u8]>,
    ) -> AssetRecord {
        AssetRecord {
            source: ByteSource::eager(content),
            immutable,
            validators: Validators {
                last_modified: "Thu, 01 Jan 2026 00:00:00 GMT".to_string(),
                etag: etag_of(content),
                size: content.len() as u64,
            },
            content_type: content_type.to_string(),
            compression: CompressionPair {
                brotli: brotli.map(ByteSource::eager),
                gzip: gzip.map(ByteSource::eager),
            },
        }
    }

    fn engine() -> StaticEngine {
        let manifest = Manifest::from_entries([
            (
                "/index.html",
                record(b"<h1>home</h1>", "text/html; charset=utf-8", false, None, None),
            ),
            (
                "/data.bin",
                record(b"0123456789", "application/octet-stream", false, None, None),
            ),
            (
                "/app.js",
                record(
                    b"console.log(1);\n",
                    "application/javascript",
                    false,
                    Some(b"br-var"),
                    Some(b"gzip-var!"),
                ),
            ),
            (
                "/_app/immutable/chunk-abc.js",
                record(b"export{};\n", "application/javascript", true, None, None),
            ),
            (
                "/about/",
                record(b"<h1>about</h1>", "text/html; charset=utf-8", false, None, None),
            ),
            (
                "/with space.txt",
                record(b"spaced", "text/plain; charset=utf-8", false, None, None),
            ),
        ]);
        StaticEngine::new(manifest, "/nonexistent-base")
    }

    fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn serves_asset_with_validators() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/data.bin", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["ETag"], etag_of(b"0123456789").as_str());
        assert_eq!(
            resp.headers()["Last-Modified"],
            "Thu, 01 Jan 2026 00:00:00 GMT"
        );
        assert_eq!(resp.headers()["Cache-Control"], "public, max-age=14400");
        assert_eq!(resp.headers()["Accept-Ranges"], "bytes");
        assert_eq!(&body_bytes(resp).await[..], b"0123456789");
    }

    #[tokio::test]
    async fn root_serves_index_html() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(&body_bytes(resp).await[..], b"<h1>home</h1>");
    }

    #[tokio::test]
    async fn immutable_assets_get_long_lived_cache_control() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/_app/immutable/chunk-abc.js", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            resp.headers()["Cache-Control"],
            "public, max-age=604800, immutable"
        );
    }

    #[tokio::test]
    async fn etag_round_trip_yields_304() {
        let engine = engine();
        let first = engine
            .serve(&request("GET", "/data.bin", &[]))
            .await
            .unwrap()
            .unwrap();
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let resp = engine
            .serve(&request("GET", "/data.bin", &[("if-none-match", &etag)]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 304);
        assert!(resp.headers().get("Cache-Control").is_none());
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn if_modified_since_matches_literally_only() {
        let engine = engine();
        let resp = engine
            .serve(&request(
                "GET",
                "/data.bin",
                &[("if-modified-since", "Thu, 01 Jan 2026 00:00:00 GMT")],
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 304);

        let resp = engine
            .serve(&request(
                "GET",
                "/data.bin",
                &[("if-modified-since", "Thu, 1 Jan 2026 00:00:00 GMT")],
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn range_first_five_bytes() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/data.bin", &[("range", "bytes=0-4")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 0-4/10");
        assert_eq!(resp.headers()["Content-Length"], "5");
        assert_eq!(&body_bytes(resp).await[..], b"01234");
    }

    #[tokio::test]
    async fn range_suffix_takes_tail() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/data.bin", &[("range", "bytes=-3")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 7-9/10");
        assert_eq!(&body_bytes(resp).await[..], b"789");
    }

    #[tokio::test]
    async fn range_out_of_bounds_is_416() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/data.bin", &[("range", "bytes=100-200")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 416);
        assert_eq!(resp.headers()["Content-Range"], "bytes */10");
    }

    #[tokio::test]
    async fn multiple_ranges_are_rejected() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/data.bin", &[("range", "bytes=0-2,4-6")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 416);
    }

    #[tokio::test]
    async fn range_bypasses_conditional_and_compression() {
        let engine = engine();
        let etag = etag_of(b"console.log(1);\n");
        let resp = engine
            .serve(&request(
                "GET",
                "/app.js",
                &[
                    ("range", "bytes=0-6"),
                    ("if-none-match", &etag),
                    ("accept-encoding", "br, gzip"),
                ],
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 206);
        assert!(resp.headers().get("Content-Encoding").is_none());
        assert!(resp.headers().get("Cache-Control").is_none());
        assert_eq!(&body_bytes(resp).await[..], b"console");
    }

    #[tokio::test]
    async fn brotli_preferred_over_gzip() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/app.js", &[("accept-encoding", "br, gzip")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.headers()["Content-Encoding"], "br");
        assert_eq!(resp.headers()["Content-Length"], "6");
        assert_eq!(resp.headers()["Content-Type"], "application/javascript");
        assert_eq!(&body_bytes(resp).await[..], b"br-var");
    }

    #[tokio::test]
    async fn gzip_served_when_brotli_not_advertised() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/app.js", &[("accept-encoding", "gzip")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.headers()["Content-Encoding"], "gzip");
        assert_eq!(&body_bytes(resp).await[..], b"gzip-var!");
    }

    #[tokio::test]
    async fn no_accept_encoding_serves_uncompressed() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/app.js", &[]))
            .await
            .unwrap()
            .unwrap();
        assert!(resp.headers().get("Content-Encoding").is_none());
        assert_eq!(&body_bytes(resp).await[..], b"console.log(1);\n");
    }

    #[tokio::test]
    async fn missing_siblings_never_encode() {
        let engine = engine();
        let resp = engine
            .serve(&request(
                "GET",
                "/data.bin",
                &[("accept-encoding", "br, gzip")],
            ))
            .await
            .unwrap()
            .unwrap();
        assert!(resp.headers().get("Content-Encoding").is_none());
        assert_eq!(&body_bytes(resp).await[..], b"0123456789");
    }

    #[tokio::test]
    async fn soft_miss_redirects_preserving_query() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/about?x=1", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers()["Location"], "/about/?x=1");
    }

    #[tokio::test]
    async fn dot_segments_are_resolved() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/sub/../data.bin", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn percent_encoded_paths_are_decoded_once() {
        let engine = engine();
        let resp = engine
            .serve(&request("GET", "/with%20space.txt", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(&body_bytes(resp).await[..], b"spaced");
    }

    #[tokio::test]
    async fn head_gets_headers_without_body() {
        let engine = engine();
        let resp = engine
            .serve(&request("HEAD", "/data.bin", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "10");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_path_defers_to_next_handler() {
        let engine = engine();
        assert!(engine
            .serve(&request("GET", "/nope", &[]))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn non_get_head_methods_defer() {
        let engine = engine();
        for method in ["POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(engine
                .serve(&request(method, "/data.bin", &[]))
                .await
                .unwrap()
                .is_none());
        }
    }
}
