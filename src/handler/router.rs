//! Request routing dispatch.
//!
//! Entry point for request processing: hand the request to the static
//! engine, and when it defers, act as the end of the chain: 405 for methods
//! static content can never serve, 404 otherwise. Engine I/O faults surface
//! as 500.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};

use crate::config::Config;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::serve::StaticEngine;

/// Everything a request needs, shared across connections.
pub struct AppState {
    pub config: Config,
    pub engine: StaticEngine,
}

/// Main entry point for request handling.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    let response = match state.engine.serve(&req).await {
        Ok(Some(response)) => response,
        Ok(None) => {
            if method == Method::GET || method == Method::HEAD {
                http::build_404_response()
            } else {
                logger::log_warning(&format!("Method not allowed: {method} {path}"));
                http::build_405_response()
            }
        }
        Err(e) => {
            logger::log_error(&format!("Byte source read failed for {path}: {e}"));
            http::build_500_response()
        }
    };

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.user_agent = user_agent;
        logger::log_access(&entry, &state.config.logging.format);
    }

    Ok(response)
}
