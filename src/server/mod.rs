//! Server module
//!
//! Accept loop: one spawned task per connection, an HTTP/1 `service_fn`
//! over shared immutable state.

pub mod listener;

pub use listener::create_listener;

use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::handler::{handle_request, AppState};
use crate::logger;

/// Accept connections until the process is stopped.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                handle_request(req, state, peer_addr)
            });
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                logger::log_connection_error(&e);
            }
        });
    }
}
