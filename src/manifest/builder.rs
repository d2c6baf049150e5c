//! Manifest construction from a compiled output tree.
//!
//! Walks the client asset sequence plus the prerendered-route table and
//! resolves one [`AssetRecord`] per servable pathname: content hash, HTTP-date
//! validator, uncompressed size, precompressed sibling probes, and the
//! immutable classification. Any unreadable file aborts the build; a partial
//! manifest is never produced.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tokio::fs;
use tokio::task::JoinSet;

use crate::http::mime;

use super::ignore::GlobPattern;
use super::record::{AssetRecord, ByteSource, CompressionPair, Manifest, Validators};

/// Upper bound on files resolved (read + hashed + probed) in flight at once.
const SCAN_CONCURRENCY: usize = 16;

/// Fatal build failures. There is no partial-success mode.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk client files: {0}")]
    Walk(#[from] io::Error),
    #[error("duplicate manifest pathname: {0}")]
    DuplicatePathname(String),
    #[error("scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Build a manifest from a finished output tree.
///
/// `client_files` is a lazy sequence of paths relative to `<base_dir>/client`;
/// it is consumed incrementally and never materialized as a whole list.
/// `prerendered` maps route pathnames to rendered files under
/// `<base_dir>/prerendered`; those records are never classified immutable.
/// `ignores` apply to the client sequence only.
pub async fn build_manifest<I>(
    base_dir: &Path,
    client_files: I,
    prerendered: &HashMap<String, String>,
    immutable_prefix: &str,
    ignores: &[GlobPattern],
) -> Result<Manifest, BuildError>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut tasks: JoinSet<Result<(String, AssetRecord), BuildError>> = JoinSet::new();
    let mut manifest = Manifest::new();

    for entry in client_files {
        let normalized = entry?.replace('\\', "/");
        if ignores.iter().any(|glob| glob.matches(&normalized)) {
            continue;
        }
        let relative = strip_leading(&normalized);
        let pathname = format!("/{relative}");
        let immutable = pathname.starts_with(immutable_prefix);
        let rel_source = format!("client/{relative}");

        while tasks.len() >= SCAN_CONCURRENCY {
            drain_one(&mut tasks, &mut manifest).await?;
        }
        tasks.spawn(resolve_record(
            base_dir.to_path_buf(),
            rel_source,
            pathname,
            immutable,
        ));
    }

    // Route-addressed HTML, never content-hashed.
    for (pathname, file) in prerendered {
        while tasks.len() >= SCAN_CONCURRENCY {
            drain_one(&mut tasks, &mut manifest).await?;
        }
        tasks.spawn(resolve_record(
            base_dir.to_path_buf(),
            format!("prerendered/{file}"),
            pathname.clone(),
            false,
        ));
    }

    while !tasks.is_empty() {
        drain_one(&mut tasks, &mut manifest).await?;
    }

    Ok(manifest)
}

/// Wait for one in-flight resolution and fold it into the manifest.
async fn drain_one(
    tasks: &mut JoinSet<Result<(String, AssetRecord), BuildError>>,
    manifest: &mut Manifest,
) -> Result<(), BuildError> {
    if let Some(joined) = tasks.join_next().await {
        let (pathname, record) = joined??;
        if manifest.insert(pathname.clone(), record).is_some() {
            return Err(BuildError::DuplicatePathname(pathname));
        }
    }
    Ok(())
}

/// Resolve everything a record needs before any of it may be emitted:
/// content hash, validators, sibling probes, media type.
async fn resolve_record(
    base: PathBuf,
    rel_source: String,
    pathname: String,
    immutable: bool,
) -> Result<(String, AssetRecord), BuildError> {
    let abs = base.join(&rel_source);
    let read_err = |source| BuildError::Read {
        path: abs.clone(),
        source,
    };

    let content = fs::read(&abs).await.map_err(&read_err)?;
    let modified = fs::metadata(&abs)
        .await
        .and_then(|meta| meta.modified())
        .map_err(&read_err)?;

    let validators = Validators {
        last_modified: http_date(modified),
        etag: format!("\"{}\"", hex::encode(blake3::hash(&content).as_bytes())),
        size: content.len() as u64,
    };
    let content_type =
        mime::content_type(abs.extension().and_then(|ext| ext.to_str())).to_string();
    let compression = CompressionPair {
        brotli: probe_sibling(&base, &rel_source, ".br").await,
        gzip: probe_sibling(&base, &rel_source, ".gz").await,
    };

    let record = AssetRecord {
        source: ByteSource::lazy(rel_source),
        immutable,
        validators,
        content_type,
        compression,
    };
    Ok((pathname, record))
}

/// Probe for a precompressed sibling by exact path concatenation. A zero-byte
/// sibling counts as absent so an empty compressed body is never served.
async fn probe_sibling(base: &Path, rel_source: &str, suffix: &str) -> Option<ByteSource> {
    let sibling = format!("{rel_source}{suffix}");
    match fs::metadata(base.join(&sibling)).await {
        Ok(meta) if meta.len() > 0 => Some(ByteSource::lazy(sibling)),
        _ => None,
    }
}

/// Drop an optional `./` or `/` prefix so the pathname gains exactly one slash.
fn strip_leading(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.strip_prefix('/').unwrap_or(path)
}

/// Format a filesystem timestamp as an HTTP-date (IMF-fixdate, GMT).
#[must_use]
pub fn http_date(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Depth-first walk of `<root>`, yielding `/`-separated relative file paths
/// lazily. Feeds [`build_manifest`] without collecting the tree up front.
pub struct ClientFileWalk {
    root: PathBuf,
    dirs: Vec<std::fs::ReadDir>,
}

impl ClientFileWalk {
    pub fn new(root: &Path) -> io::Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            dirs: vec![std::fs::read_dir(root)?],
        })
    }
}

impl Iterator for ClientFileWalk {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(read_dir) = self.dirs.last_mut() {
            match read_dir.next() {
                Some(Ok(entry)) => {
                    let path = entry.path();
                    if path.is_dir() {
                        match std::fs::read_dir(&path) {
                            Ok(nested) => self.dirs.push(nested),
                            Err(e) => return Some(Err(e)),
                        }
                    } else {
                        let rel = path.strip_prefix(&self.root).unwrap_or(&path);
                        return Some(Ok(rel.to_string_lossy().replace('\\', "/")));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.dirs.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self as stdfs, File};
    use std::io::Write;

    fn write_file(path: &Path, content: &[u8]) {
        stdfs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = File::create(path).unwrap();
        f.write_all(content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("client");
        write_file(&client.join("app.js"), b"console.log(1);\n");
        write_file(&client.join("app.js.gz"), b"gzip-bytes");
        write_file(&client.join("app.js.br"), b"br-bytes");
        write_file(&client.join("styles.css"), b"body{}\n");
        write_file(&client.join("styles.css.gz"), b""); // zero-byte sibling
        write_file(&client.join(".DS_Store"), b"junk");
        write_file(
            &client.join("_app/immutable/chunk-abc123.js"),
            b"export{};\n",
        );
        write_file(
            &dir.path().join("prerendered/about.html"),
            b"<h1>about</h1>",
        );
        dir
    }

    fn ignores() -> Vec<GlobPattern> {
        vec![
            GlobPattern::new(".*").unwrap(),
            GlobPattern::new("**/.*").unwrap(),
        ]
    }

    fn client_files(base: &Path) -> Vec<io::Result<String>> {
        ClientFileWalk::new(&base.join("client"))
            .unwrap()
            .collect()
    }

    #[tokio::test]
    async fn builds_records_with_validators_and_siblings() {
        let dir = fixture();
        let prerendered =
            HashMap::from([("/about".to_string(), "about.html".to_string())]);
        let manifest = build_manifest(
            dir.path(),
            client_files(dir.path()),
            &prerendered,
            "/_app/immutable/",
            &ignores(),
        )
        .await
        .unwrap();

        // Dotfile excluded, everything else present.
        assert_eq!(manifest.len(), 4);
        assert!(!manifest.contains("/.DS_Store"));

        let app = manifest.get("/app.js").unwrap();
        assert_eq!(app.validators.size, 16);
        let expected_etag = format!(
            "\"{}\"",
            hex::encode(blake3::hash(b"console.log(1);\n").as_bytes())
        );
        assert_eq!(app.validators.etag, expected_etag);
        assert!(app.validators.last_modified.ends_with(" GMT"));
        assert_eq!(app.content_type, "application/javascript");
        assert!(app.compression.brotli.is_some());
        assert!(app.compression.gzip.is_some());
        assert!(!app.immutable);

        // Zero-byte sibling is treated as absent.
        let css = manifest.get("/styles.css").unwrap();
        assert!(css.compression.gzip.is_none());
        assert!(css.compression.brotli.is_none());

        let chunk = manifest.get("/_app/immutable/chunk-abc123.js").unwrap();
        assert!(chunk.immutable);

        // Prerendered routes are route-addressed HTML, never immutable.
        let about = manifest.get("/about").unwrap();
        assert!(!about.immutable);
        assert_eq!(about.content_type, "text/html; charset=utf-8");
        match &about.source {
            ByteSource::Lazy(rel) => {
                assert_eq!(rel, Path::new("prerendered/about.html"));
            }
            ByteSource::Eager(_) => panic!("builder emits lazy sources"),
        }
    }

    #[tokio::test]
    async fn missing_prerender_target_aborts() {
        let dir = fixture();
        let prerendered = HashMap::from([("/gone".to_string(), "gone.html".to_string())]);
        let err = build_manifest(
            dir.path(),
            client_files(dir.path()),
            &prerendered,
            "/_app/immutable/",
            &ignores(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
    }

    #[tokio::test]
    async fn duplicate_pathname_aborts() {
        let dir = fixture();
        let files = vec![Ok("app.js".to_string()), Ok("./app.js".to_string())];
        let err = build_manifest(dir.path(), files, &HashMap::new(), "/x/", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicatePathname(p) if p == "/app.js"));
    }

    #[test]
    fn walk_yields_nested_relative_paths() {
        let dir = fixture();
        let mut paths: Vec<String> = ClientFileWalk::new(&dir.path().join("client"))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        paths.sort();
        assert!(paths.contains(&"app.js".to_string()));
        assert!(paths.contains(&"_app/immutable/chunk-abc123.js".to_string()));
    }

    #[test]
    fn http_date_is_imf_fixdate() {
        let date = http_date(SystemTime::UNIX_EPOCH);
        assert_eq!(date, "Thu, 01 Jan 1970 00:00:00 GMT");
    }
}
