pub mod dispatcher;
pub mod document_contract;
