//! HTTP protocol layer.
//!
//! Protocol primitives shared by the serving engine and the host router:
//! range parsing, conditional validation, media types, response builders.

pub mod conditional;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use conditional::Freshness;
pub use range::{parse_range, ByteRange, RangeDirective};
pub use response::{
    build_404_response, build_405_response, build_500_response, build_asset_response,
    build_not_modified_response, build_not_satisfiable_response, build_partial_response,
    build_redirect_response,
};
