// src/storage/ledger_stub.rs
//! Contract consumed from the external ledger.
//!
//! The ledger platform hands each invocation a transaction-scoped stub giving
//! key-value access to world state and a read-only view of each key's
//! committed history. Everything behind this trait (ordering, commit,
//! conflict detection) belongs to the platform.

use thiserror::Error;

/// Failures reported by the ledger itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("MVCC read conflict on key '{key}': read version {read}, committed version {committed}")]
    ReadConflict { key: String, read: usize, committed: usize },

    #[error("history cursor failed: {0}")]
    Cursor(String),

    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// One committed modification of a key, as returned by the history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction that committed the modification
    pub tx_id: String,
    /// Value written; empty for deletions
    pub value: Vec<u8>,
    /// Commit time, whole seconds since the Unix epoch
    pub timestamp_seconds: i64,
    /// Sub-second part of the commit time
    pub timestamp_nanos: i32,
    /// Whether this modification deleted the key
    pub is_delete: bool,
}

/// Lazy, oldest-first cursor over a key's history.
///
/// The underlying cursor is released when the iterator is dropped, so callers
/// may stop early or bail out with `?` without leaking it.
pub type HistoryIter<'a> = Box<dyn Iterator<Item = Result<KeyModification, StoreError>> + 'a>;

/// Transaction-scoped view of the ledger.
///
/// Reads observe committed state; writes are visible only after the platform
/// commits the transaction.
pub trait LedgerStub {
    /// Identifier of the transaction this stub belongs to
    fn tx_id(&self) -> &str;

    /// Reads the committed value stored under `key`.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stages `value` under `key` for commit.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Opens a cursor over every committed modification of `key`.
    fn get_history_for_key(&self, key: &str) -> Result<HistoryIter<'_>, StoreError>;
}
