pub mod blob_store;
pub mod config;
pub mod csv;
pub mod ledger;
pub mod llm_clients;
pub mod response;
pub mod storage;
