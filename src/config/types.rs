// Configuration types
// One section per concern: server socket, logging, asset layout.

use serde::Deserialize;

use crate::manifest::GlobPattern;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; defaults to the CPU count when unset.
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format: `combined`, `common` or `json`.
    pub format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

/// Asset layout configuration
///
/// `base_dir` is the finished output tree: `client/` for built assets,
/// `prerendered/` for rendered routes, optionally `prerendered.json` mapping
/// route pathnames to rendered files.
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    pub base_dir: String,
    /// Where `build` writes and `serve` reads the manifest.
    pub manifest_file: String,
    /// Optional path for generated Rust manifest source (eager strategy).
    pub generated_source: Option<String>,
    /// Pathname prefix under which names encode a content hash.
    pub immutable_prefix: String,
    /// Glob patterns excluded from the client scan.
    pub ignore: Vec<String>,
}

impl AssetsConfig {
    /// Compile the configured ignore globs.
    pub fn compiled_ignores(&self) -> Result<Vec<GlobPattern>, regex::Error> {
        self.ignore.iter().map(|p| GlobPattern::new(p)).collect()
    }
}
