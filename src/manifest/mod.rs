//! Build-time manifest: data model, builder, and streaming source emission.

pub mod builder;
pub mod codegen;
pub mod ignore;
pub mod record;
pub mod text;

// Re-export the working surface
pub use builder::{build_manifest, http_date, BuildError, ClientFileWalk};
pub use codegen::emit_manifest_source;
pub use ignore::GlobPattern;
pub use record::{AssetRecord, ByteSource, CompressionPair, Manifest, Validators};
