// src/main.rs

//! # Document Ledger - Main Entry Point
//!
//! Loads configuration, initialises logging and the ledger, runs
//! `initLedger`, and starts the API server.
//!
//! ## Environment Variables
//! - `DOCLEDGER_HOST`: (Optional) bind host (default: 127.0.0.1)
//! - `DOCLEDGER_PORT`: (Optional) bind port (default: 3000)
//! - `DOCLEDGER_LOG_LEVEL`: (Optional) default log filter (default: info)
//! - `RUST_LOG`: (Optional) overrides the log filter entirely

use anyhow::Context;
use document_ledger::config::AppConfig;
use document_ledger::services::api_server::ApiServer;
use document_ledger::storage::memory_ledger::InMemoryLedger;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let api_server = ApiServer::new(Arc::new(InMemoryLedger::new()));
    api_server.init_ledger().context("initLedger failed")?;

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;
    info!("Available endpoints:");
    info!("- POST /invoke");
    info!("- GET  /health");

    api_server.run(addr).await
}
