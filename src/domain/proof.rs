use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a stored bundle lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobReceipt {
    /// Content-addressed identifier of the stored bytes
    pub blob_id: String,
    pub object_id: Option<String>,
    pub blob_url: String,
    pub object_url: Option<String>,
    pub raw_response: Value,
}

/// The record whose hash is anchored on the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditProof {
    pub blob_hash: String,
    pub fairness_score: Option<f64>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    Submitted,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchoredProof {
    #[serde(flatten)]
    pub proof: AuditProof,
    pub proof_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub tx_digest: String,
    pub status: AnchorStatus,
    pub proof_hash: String,
    pub proof: AnchoredProof,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_response: Option<Value>,
}
