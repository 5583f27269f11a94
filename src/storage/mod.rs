pub mod ledger_stub;
pub mod memory_ledger;
pub mod record_store;
