// src/contracts/document_contract.rs
//! Document lifecycle contract.
//!
//! Implements registration, retrieval (current or with full history), partial
//! update and revocation of documents on the ledger. The contract holds no
//! state of its own: every call receives the transaction stub for the current
//! invocation and the ordered string arguments supplied by the caller.
//!
//! Per key the lifecycle is `Absent --register--> Live`, after which `update`
//! and `revoke` append new versions. `revoked` is an attribute of a live
//! document, not a separate state, and nothing here deletes a document.

use crate::models::document::{Document, HistoryEntry};
use crate::models::error::RegistryError;
use crate::storage::ledger_stub::{KeyModification, LedgerStub};
use crate::storage::record_store::RecordStore;
use crate::utils::serialization::{format_timestamp, from_bytes, parse_object, to_bytes};
use log::info;
use serde_json::Value;

/// Stateless document lifecycle contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentContract;

impl DocumentContract {
    /// Ledger initialisation hook.
    ///
    /// Nothing is seeded; succeeds with an empty payload whatever the arguments.
    pub fn init_ledger(&self, stub: &mut dyn LedgerStub, _args: &[String]) -> Result<Vec<u8>, RegistryError> {
        info!("[{}] ledger initialised", stub.tx_id());
        Ok(Vec::new())
    }

    /// Registers a new document under a caller-chosen key.
    ///
    /// # Arguments
    /// `args` must hold exactly 11 values: the key followed by `name`,
    /// `issuerId`, `issuedAt`, `description`, `expiresAt`, `issuedTo`,
    /// `revoked`, `revokeReason`, `documentData`, `registeredAt`. This
    /// positional order is part of the wire contract.
    ///
    /// # Returns
    /// The key, echoed back as the payload
    ///
    /// # Errors
    /// - `Invalid` if the argument count is not 11
    /// - `AlreadyExists` if a value is already stored under the key
    pub fn register_document(&self, stub: &mut dyn LedgerStub, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        expect_args(args, 11, 11, "11")?;
        let key = &args[0];
        let mut store = RecordStore::new(stub);

        if store.read(key)?.is_some() {
            return Err(RegistryError::AlreadyExists(key.clone()));
        }

        let document = Document::from_positional(&args[1..])?;
        store.write(key, to_bytes(&document)?)?;

        info!("[{}] registered document '{}'", store.tx_id(), key);
        Ok(key.clone().into_bytes())
    }

    /// Returns the stored document with its key, optionally with full history.
    ///
    /// # Arguments
    /// * `args[0]` - Key to read
    /// * `args[1]` - Optional; exactly `"full"` adds the `History` array,
    ///   anything else is ignored
    ///
    /// # Returns
    /// JSON object: the stored fields, `"History"` in full mode, and `"id"`
    ///
    /// # Errors
    /// - `Invalid` if there are not 1 or 2 arguments
    /// - `NotFound` if nothing is stored under the key
    /// - `SerializationFailure` if a stored value is not valid JSON
    pub fn get_document(&self, stub: &mut dyn LedgerStub, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        expect_args(args, 1, 2, "1 or 2")?;
        let key = &args[0];
        let full = args.get(1).is_some_and(|mode| mode == "full");
        let mut store = RecordStore::new(stub);

        let stored = store
            .read(key)?
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;
        let mut composite = parse_object(&stored).map_err(RegistryError::SerializationFailure)?;

        if full {
            let mut history = Vec::new();
            for modification in store.history(key)? {
                history.push(history_entry(modification?)?);
            }
            composite.insert("History".to_string(), serde_json::to_value(history)?);
        }
        composite.insert("id".to_string(), Value::String(key.clone()));

        Ok(to_bytes(&composite)?)
    }

    /// Overwrites selected fields of an existing document.
    ///
    /// # Arguments
    /// * `args[0]` - Key of the document
    /// * `args[1]` - JSON object whose keys are document field tags
    ///
    /// # Behavior
    /// - Recognised tags replace the field value; unknown tags are ignored
    /// - `revoked` takes a JSON boolean, every other field a JSON string
    /// - `revoked` and `revokeReason` are patchable like any other field
    ///
    /// # Errors
    /// - `Invalid` if there are not 2 arguments, the patch is not a JSON
    ///   object, or a value has the wrong type (nothing is written)
    /// - `NotFound` if nothing is stored under the key
    /// - `SerializationFailure` if the stored value is not a document
    pub fn update_document(&self, stub: &mut dyn LedgerStub, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        expect_args(args, 2, 2, "2")?;
        let key = &args[0];
        let mut store = RecordStore::new(stub);

        let mut document = load(&mut store, key)?;
        let patch = parse_object(args[1].as_bytes())
            .map_err(|e| RegistryError::Invalid(format!("patch is not a JSON object: {}", e)))?;

        let applied = document.apply_patch(&patch)?;
        store.write(key, to_bytes(&document)?)?;

        info!("[{}] updated document '{}' fields {:?}", store.tx_id(), key, applied);
        Ok(key.clone().into_bytes())
    }

    /// Marks a document as revoked with the given reason.
    ///
    /// Revoking an already revoked document overwrites the reason.
    ///
    /// # Errors
    /// - `Invalid` if there are not 2 arguments
    /// - `NotFound` if nothing is stored under the key
    pub fn revoke_document(&self, stub: &mut dyn LedgerStub, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        expect_args(args, 2, 2, "2")?;
        let key = &args[0];
        let mut store = RecordStore::new(stub);

        let mut document = load(&mut store, key)?;
        document.revoked = true;
        document.revoke_reason = args[1].clone();
        store.write(key, to_bytes(&document)?)?;

        info!("[{}] revoked document '{}'", store.tx_id(), key);
        Ok(key.clone().into_bytes())
    }
}

fn expect_args(args: &[String], min: usize, max: usize, expected: &str) -> Result<(), RegistryError> {
    if args.len() < min || args.len() > max {
        return Err(RegistryError::Invalid(format!(
            "Incorrect number of arguments. Expecting {}",
            expected
        )));
    }
    Ok(())
}

fn load(store: &mut RecordStore<'_>, key: &str) -> Result<Document, RegistryError> {
    let stored = store
        .read(key)?
        .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
    Ok(from_bytes(&stored)?)
}

fn history_entry(modification: KeyModification) -> Result<HistoryEntry, RegistryError> {
    // Empty versions read as absent, so they render like deletions
    let value = if modification.is_delete || modification.value.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&modification.value)?
    };
    Ok(HistoryEntry {
        tx_id: modification.tx_id,
        value,
        timestamp: format_timestamp(modification.timestamp_seconds, modification.timestamp_nanos),
        is_delete: modification.is_delete.to_string(),
    })
}
