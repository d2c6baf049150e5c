//! Request-time static serving.

pub mod engine;
pub mod lookup;

pub use engine::StaticEngine;
pub use lookup::{lookup, normalize_pathname, Lookup};
