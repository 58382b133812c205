pub mod audit;
pub mod bundle;
pub mod error;
pub mod explanation;
pub mod llm_config;
pub mod proof;

// Tabular input model
pub mod table;
