//! Logger module
//!
//! Logging utilities for both build and serve modes:
//! - server lifecycle and build summaries
//! - access logging in combined/common/json formats
//! - error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use crate::config::Config;

/// Initialize the logger with configuration. Called once at startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("staticd serving");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Asset base: {}", config.assets.base_dir));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info("======================================");
}

pub fn log_manifest_loaded(assets: usize, path: &str) {
    write_info(&format!("[Manifest] Loaded {assets} assets from {path}"));
}

pub fn log_build_summary(assets: usize, path: &str) {
    write_info(&format!("[Build] Wrote {assets} asset records to {path}"));
}

pub fn log_generated_source(path: &str) {
    write_info(&format!("[Build] Emitted generated manifest source to {path}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

/// Log a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
