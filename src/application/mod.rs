pub mod use_cases;

pub use use_cases::anchoring::AnchorService;
pub use use_cases::audit_pipeline::{AuditPipeline, PipelineResponse};
pub use use_cases::explain::ExplainUseCase;
pub use use_cases::fairness::{run_fairness_audit, FairnessAuditor};
