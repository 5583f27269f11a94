// src/storage/memory_ledger.rs
//! In-memory append-only ledger.
//!
//! Stands in for the external ledger platform when running the service
//! locally and in tests. Provides:
//! - Transaction-scoped stubs with buffered writes
//! - Atomic commit with MVCC read-set validation
//! - Per-key, commit-ordered history including deletion markers
//! - Cursor accounting so leaked history iterators can be detected

use crate::storage::ledger_stub::{HistoryIter, KeyModification, LedgerStub, StoreError};
use chrono::Utc;
use ring::digest::{digest, SHA256};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

/// Thread-safe in-memory ledger keyed by string.
///
/// Each key owns its full modification log; the current value is the last
/// entry unless that entry is a deletion. The version of a key is the length
/// of its log.
pub struct InMemoryLedger {
    /// Committed modifications per key, oldest first
    keys: RwLock<HashMap<String, Vec<KeyModification>>>,
    /// Monotonic counter feeding transaction ids
    nonce: AtomicU64,
    /// History cursors currently open
    open_cursors: AtomicUsize,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(0),
            open_cursors: AtomicUsize::new(0),
        }
    }

    /// Starts a transaction with a fresh transaction id.
    pub fn begin(&self) -> LedgerTransaction<'_> {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let proposed_at = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let hash = digest(&SHA256, format!("{}:{}", nonce, proposed_at).as_bytes());
        let tx_id = hash.as_ref().iter().map(|b| format!("{:02x}", b)).collect();

        LedgerTransaction {
            ledger: self,
            tx_id,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Number of history cursors not yet released.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of keys that have ever been written.
    pub fn key_count(&self) -> Result<usize, StoreError> {
        let keys = self.keys.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(keys.len())
    }

    /// Poisons the state lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.keys.write();
            panic!("poisoning ledger lock");
        }));
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// A single unit of work against an [`InMemoryLedger`].
///
/// Reads go straight to committed state and record the version observed.
/// Writes are buffered and applied only by [`commit`](Self::commit); dropping
/// the transaction discards them.
pub struct LedgerTransaction<'l> {
    ledger: &'l InMemoryLedger,
    tx_id: String,
    /// Key -> version observed at read time
    reads: HashMap<String, usize>,
    /// Key -> staged value, `None` for a deletion
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl<'l> LedgerTransaction<'l> {
    /// Stages a deletion of `key`.
    ///
    /// No contract operation deletes documents; this exists so platform-level
    /// deletions can be replayed into the ledger.
    pub fn delete_state(&mut self, key: &str) {
        self.writes.insert(key.to_string(), None);
    }

    /// Number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Validates the read set and appends every staged write atomically.
    ///
    /// # Errors
    /// - `ReadConflict` if a key read by this transaction was committed by
    ///   another transaction after the read
    /// - `LockPoisoned` if the ledger lock is poisoned
    pub fn commit(self) -> Result<(), StoreError> {
        let mut keys = self.ledger.keys.write().map_err(|_| StoreError::LockPoisoned)?;

        for (key, read) in &self.reads {
            let committed = keys.get(key).map_or(0, Vec::len);
            if committed != *read {
                return Err(StoreError::ReadConflict {
                    key: key.clone(),
                    read: *read,
                    committed,
                });
            }
        }

        let now = Utc::now();
        for (key, staged) in self.writes {
            let modification = KeyModification {
                tx_id: self.tx_id.clone(),
                is_delete: staged.is_none(),
                value: staged.unwrap_or_default(),
                timestamp_seconds: now.timestamp(),
                timestamp_nanos: now.timestamp_subsec_nanos() as i32,
            };
            keys.entry(key).or_default().push(modification);
        }
        Ok(())
    }
}

impl LedgerStub for LedgerTransaction<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let keys = self.ledger.keys.read().map_err(|_| StoreError::LockPoisoned)?;
        let log = keys.get(key);

        self.reads
            .entry(key.to_string())
            .or_insert_with(|| log.map_or(0, Vec::len));

        Ok(log
            .and_then(|versions| versions.last())
            .filter(|latest| !latest.is_delete)
            .map(|latest| latest.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Backend("key must not be empty".to_string()));
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn get_history_for_key(&self, key: &str) -> Result<HistoryIter<'_>, StoreError> {
        let keys = self.ledger.keys.read().map_err(|_| StoreError::LockPoisoned)?;
        let snapshot = keys.get(key).cloned().unwrap_or_default();

        self.ledger.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(HistoryCursor {
            entries: snapshot.into_iter(),
            open_cursors: &self.ledger.open_cursors,
        }))
    }
}

/// Snapshot cursor over one key's log; releases its slot on drop.
struct HistoryCursor<'a> {
    entries: std::vec::IntoIter<KeyModification>,
    open_cursors: &'a AtomicUsize,
}

impl Iterator for HistoryCursor<'_> {
    type Item = Result<KeyModification, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}

impl Drop for HistoryCursor<'_> {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}
