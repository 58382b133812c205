pub mod anchoring;
pub mod audit_pipeline;
pub mod explain;
pub mod fairness;
