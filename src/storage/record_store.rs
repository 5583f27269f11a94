// src/storage/record_store.rs
//! Record store adapter.
//!
//! Thin layer between the document contract and the ledger stub. Bytes pass
//! through untouched; the adapter only normalises absence, maps ledger
//! failures into [`RegistryError::StoreFailure`], and logs store traffic.

use crate::models::error::RegistryError;
use crate::storage::ledger_stub::{KeyModification, LedgerStub};
use log::debug;

/// Adapter over a transaction-scoped ledger stub.
pub struct RecordStore<'s> {
    stub: &'s mut dyn LedgerStub,
}

impl<'s> RecordStore<'s> {
    /// Wraps the stub for the current invocation.
    pub fn new(stub: &'s mut dyn LedgerStub) -> Self {
        Self { stub }
    }

    /// Transaction id of the underlying stub, for log correlation.
    pub fn tx_id(&self) -> &str {
        self.stub.tx_id()
    }

    /// Reads the current value under `key`.
    ///
    /// # Returns
    /// - `Some(bytes)` if a non-empty value is stored
    /// - `None` if the key was never written, was deleted, or holds an empty value
    pub fn read(&mut self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        let value = self.stub.get_state(key)?.filter(|bytes| !bytes.is_empty());
        debug!(
            "[{}] read '{}': {}",
            self.stub.tx_id(),
            key,
            value.as_ref().map_or("absent".to_string(), |v| format!("{} bytes", v.len()))
        );
        Ok(value)
    }

    /// Stages `value` under `key`.
    pub fn write(&mut self, key: &str, value: Vec<u8>) -> Result<(), RegistryError> {
        debug!("[{}] write '{}': {} bytes", self.stub.tx_id(), key, value.len());
        self.stub.put_state(key, value)?;
        Ok(())
    }

    /// Lazily walks the committed history of `key` in the ledger's order.
    ///
    /// The cursor is released when the returned iterator is dropped.
    pub fn history(
        &self,
        key: &str,
    ) -> Result<impl Iterator<Item = Result<KeyModification, RegistryError>> + '_, RegistryError> {
        debug!("[{}] history '{}'", self.stub.tx_id(), key);
        let cursor = self.stub.get_history_for_key(key)?;
        Ok(cursor.map(|entry| entry.map_err(RegistryError::from)))
    }
}
