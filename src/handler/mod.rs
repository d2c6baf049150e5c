//! Request handler module
//!
//! Dispatches incoming requests to the static engine and terminates the
//! chain when nothing claims the path.

pub mod router;

pub use router::{handle_request, AppState};
