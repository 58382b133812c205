use super::audit::AuditOutcome;
use super::explanation::Explanation;
use serde::{Deserialize, Serialize};

pub const BUNDLE_VERSION: &str = "1.0.0";

/// Self-contained audit record persisted to the blob store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditBundle {
    pub timestamp: i64,
    pub filename: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub metrics: AuditOutcome,
    pub explanation: Explanation,
    pub version: String,
}

impl AuditBundle {
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}
