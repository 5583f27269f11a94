// src/contracts/dispatcher.rs
//! Invocation dispatch for the document contract.
//!
//! Routes an operation name plus ordered string arguments to the matching
//! contract handler and wraps the outcome in a [`Response`].

use crate::contracts::document_contract::DocumentContract;
use crate::models::error::RegistryError;
use crate::storage::ledger_stub::LedgerStub;
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Status of a successful invocation.
pub const OK: i32 = 200;

/// Status of a failed invocation.
pub const ERROR: i32 = 500;

/// Signature shared by every contract operation.
pub type Handler = fn(&DocumentContract, &mut dyn LedgerStub, &[String]) -> Result<Vec<u8>, RegistryError>;

/// Operation name -> handler, built on first use and never modified.
static HANDLERS: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
    handlers.insert("initLedger", DocumentContract::init_ledger);
    handlers.insert("getDocument", DocumentContract::get_document);
    handlers.insert("registerDocument", DocumentContract::register_document);
    handlers.insert("updateDocument", DocumentContract::update_document);
    handlers.insert("revokeDocument", DocumentContract::revoke_document);
    handlers
});

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// [`OK`] or [`ERROR`]
    pub status: i32,
    /// Error sentinel, absent on success
    pub code: Option<String>,
    /// Human-readable detail, empty on success
    pub message: String,
    /// Operation payload, empty on failure
    pub payload: Vec<u8>,
}

impl Response {
    /// Successful response carrying `payload`.
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            code: None,
            message: String::new(),
            payload,
        }
    }

    /// Failed response built from a contract error.
    pub fn error(err: &RegistryError) -> Self {
        Self {
            status: ERROR,
            code: Some(err.code().to_string()),
            message: err.to_string(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}

/// Entry point receiving invocations from the hosting platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher {
    contract: DocumentContract,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every routable operation, sorted.
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = HANDLERS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Runs `function` with `args` against the given transaction stub.
    ///
    /// Unknown function names fail with `Invalid`. Committing or discarding
    /// the transaction is left to the caller.
    pub fn invoke(&self, stub: &mut dyn LedgerStub, function: &str, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        let handler = HANDLERS
            .get(function)
            .ok_or_else(|| RegistryError::Invalid("Invalid Smart Contract function name.".to_string()))?;

        debug!("[{}] invoke {} with {} args", stub.tx_id(), function, args.len());
        handler(&self.contract, stub, args)
    }

    /// Like [`invoke`](Self::invoke) but folds the outcome into a [`Response`].
    pub fn respond(&self, stub: &mut dyn LedgerStub, function: &str, args: &[String]) -> Response {
        let tx_id = stub.tx_id().to_string();
        match self.invoke(stub, function, args) {
            Ok(payload) => Response::success(payload),
            Err(err) => {
                warn!("[{}] {} failed: {} ({})", tx_id, function, err, err.code());
                Response::error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_ledger::InMemoryLedger;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_routes_all_operations() {
        assert_eq!(
            Dispatcher::new().operations(),
            vec!["getDocument", "initLedger", "registerDocument", "revokeDocument", "updateDocument"]
        );
    }

    #[test]
    fn test_unknown_function_rejected() {
        let ledger = InMemoryLedger::new();
        let mut tx = ledger.begin();
        let response = Dispatcher::new().respond(&mut tx, "deleteDocument", &args(&["doc1"]));

        assert!(!response.is_ok());
        assert_eq!(response.status, ERROR);
        assert_eq!(response.code.as_deref(), Some("INVALID_ARGUMENT"));
        assert_eq!(response.message, "Invalid Smart Contract function name.");
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_init_ledger_succeeds_empty() {
        let ledger = InMemoryLedger::new();
        let mut tx = ledger.begin();
        let response = Dispatcher::new().respond(&mut tx, "initLedger", &[]);
        assert_eq!(response, Response::success(Vec::new()));
    }

    #[test]
    fn test_full_lifecycle_through_dispatch() {
        let ledger = InMemoryLedger::new();
        let dispatcher = Dispatcher::new();
        let steps: Vec<(&str, Vec<String>)> = vec![
            (
                "registerDocument",
                args(&["doc1", "Passport", "IssuerA", "2024-01-01", "desc", "2030-01-01", "Alice", "false", "", "payload", "2024-01-01"]),
            ),
            ("updateDocument", args(&["doc1", r#"{"issuedTo":"Alicia"}"#])),
            ("revokeDocument", args(&["doc1", "forged"])),
        ];

        for (function, step_args) in steps {
            let mut tx = ledger.begin();
            let response = dispatcher.respond(&mut tx, function, &step_args);
            assert_eq!(response.payload, b"doc1".to_vec(), "{}", function);
            tx.commit().unwrap();
        }

        let mut tx = ledger.begin();
        let response = dispatcher.respond(&mut tx, "getDocument", &args(&["doc1"]));
        let doc: serde_json::Value = serde_json::from_slice(&response.payload).unwrap();
        assert_eq!(doc["issuedTo"], "Alicia");
        assert_eq!(doc["revoked"], true);
        assert_eq!(doc["revokeReason"], "forged");
    }

    #[test]
    fn test_error_codes_distinguish_missing_and_existing() {
        let ledger = InMemoryLedger::new();
        let dispatcher = Dispatcher::new();

        let mut tx = ledger.begin();
        let missing = dispatcher.respond(&mut tx, "revokeDocument", &args(&["nope", "r"]));
        assert_eq!(missing.code.as_deref(), Some(crate::models::error::NOT_FOUND_ERROR));

        let register = args(&["k", "n", "i", "a", "d", "e", "t", "false", "", "p", "r"]);
        let mut tx = ledger.begin();
        assert!(dispatcher.respond(&mut tx, "registerDocument", &register).is_ok());
        tx.commit().unwrap();

        let mut tx = ledger.begin();
        let again = dispatcher.respond(&mut tx, "registerDocument", &register);
        assert_eq!(again.code.as_deref(), Some(crate::models::error::ALREADY_EXIST_ERROR));
    }
}
