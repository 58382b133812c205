//! Upload-to-ledger flow.
//!
//! Only a bad upload (wrong extension, empty, too large, unparseable) fails
//! the request. Engine, explanation, blob and ledger problems are folded into
//! the response so the caller always gets the bundle back.

use super::anchoring::AnchorService;
use super::explain::ExplainUseCase;
use super::fairness::FairnessAuditor;
use crate::domain::audit::AuditOutcome;
use crate::domain::bundle::{AuditBundle, BUNDLE_VERSION};
use crate::domain::error::{AppError, Result};
use crate::domain::proof::{AnchorReceipt, BlobReceipt};
use crate::domain::table::Table;
use crate::infrastructure::blob_store::{build_blob_store, BlobStore};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::storage::{remove_file_safe, TempStorage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_UPLOAD_NAME: &str = "upload.csv";

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LedgerOutcome {
    Anchored(AnchorReceipt),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResponse {
    Success {
        bundle: AuditBundle,
        blob: BlobReceipt,
        ledger: LedgerOutcome,
    },
    BlobUploadFailed {
        error: String,
        bundle: AuditBundle,
    },
}

impl PipelineResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineResponse::Success { .. } => 200,
            PipelineResponse::BlobUploadFailed { .. } => 500,
        }
    }

    pub fn bundle(&self) -> &AuditBundle {
        match self {
            PipelineResponse::Success { bundle, .. } => bundle,
            PipelineResponse::BlobUploadFailed { bundle, .. } => bundle,
        }
    }
}

pub struct AuditPipeline {
    auditor: FairnessAuditor,
    explainer: ExplainUseCase,
    blob_store: Arc<dyn BlobStore>,
    anchor: Arc<AnchorService>,
    temp: TempStorage,
    max_upload_bytes: u64,
    max_upload_mb: u64,
}

impl AuditPipeline {
    pub fn new(
        auditor: FairnessAuditor,
        explainer: ExplainUseCase,
        blob_store: Arc<dyn BlobStore>,
        anchor: Arc<AnchorService>,
        temp: TempStorage,
        max_upload_mb: u64,
    ) -> Self {
        Self {
            auditor,
            explainer,
            blob_store,
            anchor,
            temp,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            max_upload_mb,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        anchor: Arc<AnchorService>,
    ) -> Self {
        Self::new(
            FairnessAuditor::new(config.audit.threshold),
            ExplainUseCase::new(llm_client, config.explain.clone()),
            build_blob_store(&config.blob_store),
            anchor,
            TempStorage::new(&config.server.tmp_dir),
            config.server.max_upload_mb,
        )
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_mb
    }

    /// Reject uploads that can never be audited
    pub fn check_upload(&self, filename: &str, size: usize) -> Result<()> {
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(AppError::InputError(
                "Only CSV files are accepted.".to_string(),
            ));
        }
        if size == 0 {
            return Err(AppError::MissingUpload);
        }
        if size as u64 > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge {
                limit_mb: self.max_upload_mb,
            });
        }
        Ok(())
    }

    pub async fn run(&self, filename: &str, bytes: Vec<u8>) -> Result<PipelineResponse> {
        info!(filename, size = bytes.len(), "File received");
        self.check_upload(filename, bytes.len())?;

        let timestamp = chrono::Utc::now().timestamp();
        let request_id = Uuid::new_v4();
        let csv_path = self.temp.save(filename, &bytes, timestamp, request_id)?;
        drop(bytes);

        let parsed = self.parse_and_audit(csv_path.clone()).await;
        let (table, metrics) = match parsed {
            Ok(done) => done,
            Err(e) => {
                remove_file_safe(&csv_path);
                return Err(e);
            }
        };

        let explanation = self.explainer.execute(&metrics).await;

        let bundle = AuditBundle {
            timestamp,
            filename: filename.to_string(),
            rows: table.row_count(),
            columns: table.column_names(),
            metrics,
            explanation,
            version: BUNDLE_VERSION.to_string(),
        };

        let bundle_bytes = match bundle.to_json_bytes() {
            Ok(b) => b,
            Err(e) => {
                remove_file_safe(&csv_path);
                return Err(e.into());
            }
        };
        let bundle_path = match self
            .temp
            .write(
                &format!("bundle_{}_{}.json", timestamp, request_id.simple()),
                &bundle_bytes,
            )
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Could not write bundle to temp storage");
                None
            }
        };

        let blob = match self.blob_store.put(bundle_bytes).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(error = %e, "Blob upload failed");
                self.cleanup(&csv_path, bundle_path.as_deref());
                return Ok(PipelineResponse::BlobUploadFailed {
                    error: e.detail(),
                    bundle,
                });
            }
        };
        info!(blob_id = %blob.blob_id, "Bundle stored");

        let ledger = match self
            .anchor
            .anchor(&blob.blob_id, bundle.metrics.fairness_score())
            .await
        {
            Ok(receipt) => LedgerOutcome::Anchored(receipt),
            Err(e) => {
                error!(error = %e, "Ledger anchoring failed");
                LedgerOutcome::Failed { error: e.detail() }
            }
        };

        self.cleanup(&csv_path, bundle_path.as_deref());

        Ok(PipelineResponse::Success {
            bundle,
            blob,
            ledger,
        })
    }

    async fn parse_and_audit(&self, csv_path: PathBuf) -> Result<(Table, AuditOutcome)> {
        let auditor = self.auditor;
        tokio::task::spawn_blocking(move || -> Result<(Table, AuditOutcome)> {
            let bytes = std::fs::read(&csv_path)?;
            let table = CsvParser::new()
                .parse_bytes(&bytes)
                .map_err(|e| AppError::ParseError(format!("Invalid CSV file. {}", e.detail())))?;

            let metrics = match auditor.audit(&table) {
                Ok(result) => AuditOutcome::Completed(Box::new(result)),
                Err(e) => {
                    warn!(error = %e, "Fairness audit failed");
                    AuditOutcome::Failed { error: e.detail() }
                }
            };
            Ok((table, metrics))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Audit task failed: {}", e)))?
    }

    fn cleanup(&self, csv_path: &Path, bundle_path: Option<&Path>) {
        remove_file_safe(csv_path);
        if let Some(path) = bundle_path {
            remove_file_safe(path);
        }
    }
}
