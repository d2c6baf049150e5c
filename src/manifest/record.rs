//! Asset record types shared by the manifest builder and the serving engine.
//!
//! A [`Manifest`] maps URL pathnames to [`AssetRecord`]s. It is produced once
//! at build time, loaded whole at process start, and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use hyper::body::Bytes;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Opaque handle to an asset's bytes.
///
/// Two resolution strategies share one read contract:
/// - `Eager`: content embedded directly in the build artifact, for
///   self-contained deployables (generated source uses this variant).
/// - `Lazy`: a relative path joined with the configured base directory at
///   request time.
#[derive(Debug, Clone)]
pub enum ByteSource {
    Eager(Bytes),
    Lazy(PathBuf),
}

impl ByteSource {
    /// Wrap static embedded content (used by generated manifest source).
    #[must_use]
    pub fn eager(content: &'static [u8]) -> Self {
        Self::Eager(Bytes::from_static(content))
    }

    /// Reference content by a path relative to the serving base directory.
    pub fn lazy(relative: impl Into<PathBuf>) -> Self {
        Self::Lazy(relative.into())
    }

    /// Total size in bytes.
    pub async fn len(&self, base: &Path) -> io::Result<u64> {
        match self {
            Self::Eager(bytes) => Ok(bytes.len() as u64),
            Self::Lazy(rel) => Ok(tokio::fs::metadata(base.join(rel)).await?.len()),
        }
    }

    /// Read the entire content.
    pub async fn read(&self, base: &Path) -> io::Result<Bytes> {
        match self {
            Self::Eager(bytes) => Ok(bytes.clone()),
            Self::Lazy(rel) => Ok(Bytes::from(tokio::fs::read(base.join(rel)).await?)),
        }
    }

    /// Read the half-open byte range `[start, end)`.
    ///
    /// Lazy sources seek to `start` rather than reading the whole file. The
    /// caller validates the range against the recorded uncompressed size; a
    /// range that outruns the underlying bytes is an I/O error.
    pub async fn read_range(&self, base: &Path, start: u64, end: u64) -> io::Result<Bytes> {
        let length = usize::try_from(end.saturating_sub(start))
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "range length overflow"))?;
        match self {
            Self::Eager(bytes) => {
                let (Ok(start), Ok(end)) = (usize::try_from(start), usize::try_from(end)) else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "range offset overflow",
                    ));
                };
                if start > end || end > bytes.len() {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "range beyond embedded content",
                    ));
                }
                Ok(bytes.slice(start..end))
            }
            Self::Lazy(rel) => {
                let mut file = File::open(base.join(rel)).await?;
                file.seek(SeekFrom::Start(start)).await?;
                let mut buf = vec![0u8; length];
                file.read_exact(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

// Only the lazy strategy round-trips through manifest.json; eager content is
// embedded via generated source and never serialized.
impl Serialize for ByteSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Lazy(rel) => serializer.serialize_str(&rel.to_string_lossy()),
            Self::Eager(_) => Err(ser::Error::custom(
                "embedded byte sources cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ByteSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RelPathVisitor;

        impl Visitor<'_> for RelPathVisitor {
            type Value = ByteSource;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a relative byte-source path")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSource, E> {
                Ok(ByteSource::lazy(v))
            }
        }

        deserializer.deserialize_str(RelPathVisitor)
    }
}

/// Response validators computed at build time from the uncompressed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validators {
    /// HTTP-date of the source file's last modification.
    pub last_modified: String,
    /// Quoted strong validator: hex content hash of the uncompressed bytes.
    pub etag: String,
    /// Uncompressed byte length.
    pub size: u64,
}

/// Precompressed sibling handles. A `Some` handle is the availability flag:
/// the sibling existed (with nonzero size) when the manifest was built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressionPair {
    pub brotli: Option<ByteSource>,
    pub gzip: Option<ByteSource>,
}

/// One servable URL pathname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Uncompressed content handle.
    pub source: ByteSource,
    /// True iff the pathname falls under the configured content-hashed prefix.
    pub immutable: bool,
    pub validators: Validators,
    /// Media type of the original asset, served regardless of encoding.
    pub content_type: String,
    pub compression: CompressionPair,
}

/// Immutable pathname → record mapping.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    records: HashMap<String, AssetRecord>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-resolved entries (used by generated manifest source).
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AssetRecord)>,
    {
        Self {
            records: entries
                .into_iter()
                .map(|(pathname, record)| (pathname.into(), record))
                .collect(),
        }
    }

    /// Insert a record, returning the previous one if the pathname was taken.
    pub fn insert(&mut self, pathname: String, record: AssetRecord) -> Option<AssetRecord> {
        self.records.insert(pathname, record)
    }

    #[must_use]
    pub fn get(&self, pathname: &str) -> Option<&AssetRecord> {
        self.records.get(pathname)
    }

    #[must_use]
    pub fn contains(&self, pathname: &str) -> bool {
        self.records.contains_key(pathname)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}
