//! Relayer client for anchoring proofs on Sui.
//!
//! The relayer owns the signing keys: it accepts a proof as JSON, submits the
//! transaction and answers with the digest. This crate never signs anything.

use crate::domain::error::{AppError, Result};
use crate::domain::proof::{AnchoredProof, Verification};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Relayer answer to a proof submission
#[derive(Debug, Clone, PartialEq)]
pub struct RelayerReply {
    pub status_code: u16,
    pub body: Value,
}

#[async_trait]
pub trait LedgerRelayer: Send + Sync {
    async fn submit(&self, proof: &AnchoredProof) -> Result<RelayerReply>;
    async fn verify(&self, tx_digest: &str, proof_hash: &str) -> Result<Verification>;
}

pub struct HttpRelayer {
    client: reqwest::Client,
    submit_url: String,
    timeout: Duration,
}

impl HttpRelayer {
    pub fn new(submit_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            submit_url: submit_url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn verify_url(&self) -> String {
        format!("{}/verify", self.submit_url.trim_end_matches('/'))
    }

    /// Response body as JSON, with a flag telling whether it parsed. Plain
    /// text is wrapped as `{"text": ...}`.
    async fn body_of(response: reqwest::Response) -> (Value, bool) {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str(&text) {
            Ok(value) => (value, true),
            Err(_) => (json!({ "text": text }), false),
        }
    }
}

#[async_trait]
impl LedgerRelayer for HttpRelayer {
    async fn submit(&self, proof: &AnchoredProof) -> Result<RelayerReply> {
        let response = self
            .client
            .post(&self.submit_url)
            .timeout(self.timeout)
            .json(proof)
            .send()
            .await
            .map_err(|e| AppError::LedgerError(format!("Relayer request failed: {}", e)))?;

        let status = response.status();
        let (body, _) = Self::body_of(response).await;
        if !status.is_success() {
            return Err(AppError::LedgerError(format!(
                "Relayer rejected proof ({}): {}",
                status, body
            )));
        }

        Ok(RelayerReply {
            status_code: status.as_u16(),
            body,
        })
    }

    async fn verify(&self, tx_digest: &str, proof_hash: &str) -> Result<Verification> {
        let response = self
            .client
            .get(self.verify_url())
            .query(&[("tx", tx_digest), ("proof_hash", proof_hash)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::LedgerError(format!("Relayer verification failed: {}", e)))?;

        let ok = response.status() == reqwest::StatusCode::OK;
        let (body, is_json) = Self::body_of(response).await;
        let verified = if is_json {
            body.get("verified").and_then(Value::as_bool).unwrap_or(false)
        } else {
            ok
        };

        Ok(Verification {
            verified,
            method: "relayer".to_string(),
            relayer_response: Some(body),
        })
    }
}
