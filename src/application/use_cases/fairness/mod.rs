//! Fairness audit engine.
//!
//! Pipeline: role detection -> binarization of label and prediction ->
//! per-protected-column group statistics -> aggregate score. Pure and
//! synchronous; every call works only on the table it is given.
//!
//! When no prediction column exists the label is used as its own prediction,
//! so TPR/FPR gaps collapse to zero and only the demographic parity
//! difference (computed from per-group label positivity) is meaningful.

pub mod aggregate;
pub mod binarize;
pub mod group_stats;
pub mod roles;

use crate::domain::audit::{AuditResult, FairnessAnalysis};
use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;
use tracing::info;

pub use aggregate::{aggregate, classify_task};
pub use binarize::{binarize, choose_positive_class, BinaryDecisions, DEFAULT_THRESHOLD};
pub use group_stats::{analyze_protected, safe_divide};
pub use roles::detect_roles;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fairness audit with a configurable probability threshold
#[derive(Debug, Clone, Copy)]
pub struct FairnessAuditor {
    threshold: f64,
}

impl Default for FairnessAuditor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FairnessAuditor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Audit `table`. Fails only when the table has fewer than two columns;
    /// every other degenerate shape resolves to `None` fields.
    pub fn audit(&self, table: &Table) -> Result<AuditResult> {
        let roles = detect_roles(table)?;

        let label_column = table
            .column(&roles.label)
            .ok_or_else(|| AppError::Internal(format!("Label column '{}' vanished", roles.label)))?;
        let prediction_name = roles.prediction_or_label().to_string();
        let prediction_column = table.column(&prediction_name).unwrap_or(label_column);

        let task_type = classify_task(label_column);

        let positive_class = choose_positive_class(label_column);
        let y_true = binarize(label_column, positive_class.as_ref(), self.threshold);
        let y_pred = binarize(prediction_column, positive_class.as_ref(), self.threshold);

        let analysis: Vec<FairnessAnalysis> = roles
            .protected
            .iter()
            .map(|column| analyze_protected(table, column, &y_true, &y_pred))
            .collect();

        let primary_protected = roles
            .protected
            .first()
            .cloned()
            .or_else(|| table.column_names().into_iter().next())
            .unwrap_or_default();

        let fairness_score = if analysis.is_empty() {
            let primary = analyze_protected(table, &primary_protected, &y_true, &y_pred);
            aggregate(std::slice::from_ref(&primary))
        } else {
            aggregate(&analysis)
        };

        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            label = %roles.label,
            protected = roles.protected.len(),
            fairness_score = ?fairness_score,
            "Fairness audit complete"
        );

        Ok(AuditResult {
            detected_label: roles.label.clone(),
            label_detection_reason: roles.label_reason,
            detected_prediction: prediction_name,
            task_type,
            protected_columns: roles.protected,
            primary_protected,
            analysis,
            fairness_score,
            rows: table.row_count(),
            columns: table.column_count(),
            engine_version: ENGINE_VERSION.to_string(),
        })
    }
}

/// Audit with the default 0.5 probability threshold
pub fn run_fairness_audit(table: &Table) -> Result<AuditResult> {
    FairnessAuditor::default().audit(table)
}
