// src/lib.rs

//! # Document Ledger
//!
//! Lifecycle management for documents kept on an append-only, key-addressed
//! ledger: registration, partial update, revocation, and retrieval of the
//! current version or of the full version history.
//!
//! ## Architecture Overview
//! 1. **Storage Layer**: `LedgerStub` contract, in-memory ledger, record store adapter
//! 2. **Contracts Layer**: document lifecycle operations and the operation dispatcher
//! 3. **Services Layer**: HTTP surface over the dispatcher
//! 4. **Models**: document, history entry and error taxonomy

pub mod config;    // Runtime configuration
pub mod contracts; // Lifecycle operations and dispatch
pub mod models;    // Data structures
pub mod services;  // HTTP API
pub mod storage;   // Ledger contract and adapters
pub mod utils;     // Helper functions
