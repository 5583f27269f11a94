// src/config.rs
//! Runtime configuration.
//!
//! Values are layered from built-in defaults and `DOCLEDGER_*` environment
//! variables (a `.env` file is loaded into the environment first by `main`).

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

/// Server configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Default log filter (trace, debug, info, warn, error); `RUST_LOG` wins
    pub log_level: String,
}

impl AppConfig {
    /// Loads configuration from defaults and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix("DOCLEDGER"))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Address the API server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
