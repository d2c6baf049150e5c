//! Static-asset manifest compiler and range-aware serving engine.
//!
//! Two components consumed in strict temporal order: the [`manifest`]
//! builder scans a finished output tree into an immutable pathname → record
//! mapping (or generated source text embedding it), and the [`serve`] engine
//! resolves requests against that mapping with byte-range, conditional
//! caching, and content-encoding semantics. Data flows one way:
//! builder → manifest → engine.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod manifest;
pub mod serve;
pub mod server;
