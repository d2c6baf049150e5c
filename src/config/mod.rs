// Configuration module entry point
// Loads settings from config.toml plus STATICD_-prefixed environment variables.

mod types;

use std::net::SocketAddr;

pub use types::{AssetsConfig, Config, LoggingConfig, ServerConfig};

impl Config {
    /// Load configuration from the default `config.toml` location.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the specified file path (without extension).
    /// The file is optional; every setting has a default.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("STATICD").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.format", "combined")?
            .set_default("assets.base_dir", "build")?
            .set_default("assets.manifest_file", "manifest.json")?
            .set_default("assets.immutable_prefix", "/_app/immutable/")?
            .set_default("assets.ignore", vec![".*".to_string(), "**/.*".to_string()])?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
