use serde::{Deserialize, Serialize};

/// Role assigned to a column by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Label,
    Prediction,
    Protected,
    Other,
}

/// How the label column was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelReason {
    NameMatch,
    Heuristic,
    NotFound,
}

/// Informational framing of the label column. The analysis always proceeds as
/// binary classification regardless of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Binary,
    Multiclass,
    Regression,
}

/// Outcome of role detection over one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRoles {
    pub label: String,
    pub label_reason: LabelReason,
    pub prediction: Option<String>,
    pub protected: Vec<String>,
}

impl DetectedRoles {
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if column == self.label {
            ColumnRole::Label
        } else if self.prediction.as_deref() == Some(column) {
            ColumnRole::Prediction
        } else if self.protected.iter().any(|c| c == column) {
            ColumnRole::Protected
        } else {
            ColumnRole::Other
        }
    }

    /// Column whose binarized values act as predictions; the label itself when
    /// no prediction column exists
    pub fn prediction_or_label(&self) -> &str {
        self.prediction.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }
}

/// Statistics for one value of a protected column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub group: String,
    pub size: usize,
    pub selection_rate: Option<f64>,
    pub confusion: Option<ConfusionCounts>,
    pub tpr: Option<f64>,
    pub fpr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessAnalysis {
    pub protected_column: String,
    pub groups: Vec<GroupStat>,
    pub demographic_parity_difference: Option<f64>,
    pub disparate_impact_ratio: Option<f64>,
    pub tpr_gap: Option<f64>,
    pub fpr_gap: Option<f64>,
}

/// Root output of one audit invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub detected_label: String,
    pub label_detection_reason: LabelReason,
    /// Equals `detected_label` when no prediction column was found
    pub detected_prediction: String,
    pub task_type: TaskType,
    pub protected_columns: Vec<String>,
    pub primary_protected: String,
    pub analysis: Vec<FairnessAnalysis>,
    pub fairness_score: Option<f64>,
    pub rows: usize,
    pub columns: usize,
    pub engine_version: String,
}

impl AuditResult {
    /// Demographic parity difference of the primary protected column
    pub fn primary_dp_difference(&self) -> Option<f64> {
        self.analysis
            .iter()
            .find(|a| a.protected_column == self.primary_protected)
            .and_then(|a| a.demographic_parity_difference)
    }
}

/// Metrics slot of an audit bundle: the result, or the reason the engine refused the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditOutcome {
    Completed(Box<AuditResult>),
    Failed { error: String },
}

impl AuditOutcome {
    pub fn result(&self) -> Option<&AuditResult> {
        match self {
            AuditOutcome::Completed(result) => Some(result),
            AuditOutcome::Failed { .. } => None,
        }
    }

    pub fn fairness_score(&self) -> Option<f64> {
        self.result().and_then(|r| r.fairness_score)
    }
}
