//! Proof hashing and ledger anchoring.
//!
//! A proof is `{blob_hash, fairness_score, timestamp}`; its hash is the
//! SHA-256 of the canonical JSON form. With a relayer configured the proof is
//! submitted through it, otherwise (or when the relayer fails) a simulated
//! receipt is issued whose digest embeds the hash prefix, so it can still be
//! checked offline.

use crate::domain::error::{AppError, Result};
use crate::domain::proof::{AnchorReceipt, AnchorStatus, AnchoredProof, AuditProof, Verification};
use crate::infrastructure::config::{LedgerConfig, DEFAULT_EXPLORER_TEMPLATE};
use crate::infrastructure::ledger::{HttpRelayer, LedgerRelayer};
use crate::shared::hashing::canonical_hash;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SIMULATED_TX_PREFIX: &str = "simulated_sui_tx_";
const SIMULATED_HASH_CHARS: usize = 12;
const RELAYER_FALLBACK_HASH_CHARS: usize = 8;

/// SHA-256 hex of the canonical JSON form of `proof`
pub fn compute_proof_hash(proof: &AuditProof) -> Result<String> {
    Ok(canonical_hash(proof)?)
}

pub struct AnchorService {
    relayer: Option<Arc<dyn LedgerRelayer>>,
    explorer_url_template: String,
}

impl AnchorService {
    pub fn new(relayer: Option<Arc<dyn LedgerRelayer>>, explorer_url_template: impl Into<String>) -> Self {
        Self {
            relayer,
            explorer_url_template: explorer_url_template.into(),
        }
    }

    /// Simulated receipts only
    pub fn simulated() -> Self {
        Self::new(None, DEFAULT_EXPLORER_TEMPLATE)
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        let relayer = config
            .relayer_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| Arc::new(HttpRelayer::new(url, config.timeout_secs)) as Arc<dyn LedgerRelayer>);
        Self::new(relayer, config.explorer_url_template.clone())
    }

    pub fn has_relayer(&self) -> bool {
        self.relayer.is_some()
    }

    /// Anchor `(content_id, score)` stamped with the current time
    pub async fn anchor(&self, content_id: &str, fairness_score: Option<f64>) -> Result<AnchorReceipt> {
        self.anchor_at(content_id, fairness_score, chrono::Utc::now().timestamp())
            .await
    }

    pub async fn anchor_at(
        &self,
        content_id: &str,
        fairness_score: Option<f64>,
        timestamp: i64,
    ) -> Result<AnchorReceipt> {
        if content_id.is_empty() {
            return Err(AppError::LedgerError("no_blob_hash".to_string()));
        }

        let proof = AuditProof {
            blob_hash: content_id.to_string(),
            fairness_score,
            timestamp,
        };
        let proof_hash = compute_proof_hash(&proof)?;
        let anchored = AnchoredProof {
            proof,
            proof_hash: proof_hash.clone(),
        };

        if let Some(relayer) = &self.relayer {
            match relayer.submit(&anchored).await {
                Ok(reply) => {
                    let tx_digest = ["tx_digest", "tx"]
                        .iter()
                        .filter_map(|key| reply.body.get(*key))
                        .filter_map(|v| v.as_str())
                        .find(|v| !v.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| {
                            format!(
                                "relayer_response_{}",
                                &proof_hash[..RELAYER_FALLBACK_HASH_CHARS]
                            )
                        });
                    info!(tx_digest = %tx_digest, proof_hash = %proof_hash, "Proof submitted to relayer");
                    return Ok(AnchorReceipt {
                        tx_digest,
                        status: AnchorStatus::Submitted,
                        proof_hash,
                        proof: anchored,
                        explorer_url: None,
                        relayer_response: Some(reply.body),
                        relayer_status_code: Some(reply.status_code),
                    });
                }
                Err(e) => {
                    error!(error = %e, "Relayer submission failed; issuing simulated receipt");
                }
            }
        }

        let tx_digest = format!("{}{}", SIMULATED_TX_PREFIX, &proof_hash[..SIMULATED_HASH_CHARS]);
        let explorer_url = self.explorer_url_template.replace("{tx}", &tx_digest);
        info!(tx_digest = %tx_digest, proof_hash = %proof_hash, "Simulated anchor receipt");

        Ok(AnchorReceipt {
            tx_digest,
            status: AnchorStatus::Simulated,
            proof_hash,
            proof: anchored,
            explorer_url: Some(explorer_url),
            relayer_response: None,
            relayer_status_code: None,
        })
    }

    /// Ask the relayer; without one (or when it fails) check that the digest
    /// carries the hash prefix the simulated receipt would have.
    pub async fn verify(&self, tx_digest: &str, proof_hash: &str) -> Verification {
        if let Some(relayer) = &self.relayer {
            match relayer.verify(tx_digest, proof_hash).await {
                Ok(verification) => return verification,
                Err(e) => warn!(error = %e, "Relayer verification failed; using simulated check"),
            }
        }

        let prefix: String = proof_hash.chars().take(SIMULATED_HASH_CHARS).collect();
        Verification {
            verified: !prefix.is_empty() && tx_digest.ends_with(&prefix),
            method: "simulated".to_string(),
            relayer_response: None,
        }
    }
}
