//! Scalar reductions over per-column analyses.

use crate::domain::audit::{FairnessAnalysis, TaskType};
use crate::domain::table::Column;

/// Distinct numeric values above which a label reads as a regression target
const REGRESSION_DISTINCT_NUMERIC: usize = 50;
/// Distinct text values above which a label reads as unsuitable for classification
const REGRESSION_DISTINCT_TEXT: usize = 10;

/// Fairness score of the primary (first) analysis.
///
/// `max(0, 100 - 100 * |dp|)`: a simple monotonic, bounded transform of the
/// demographic parity difference. Not a calibrated fairness index.
pub fn aggregate(analyses: &[FairnessAnalysis]) -> Option<f64> {
    analyses
        .first()
        .and_then(|primary| primary.demographic_parity_difference)
        .map(score_from_dp_difference)
}

pub fn score_from_dp_difference(dp: f64) -> f64 {
    (100.0 - dp.abs() * 100.0).max(0.0)
}

/// Informational task framing of the label column
pub fn classify_task(label: &Column) -> TaskType {
    let distinct = label.distinct_count();
    if label.is_numeric() {
        if distinct > REGRESSION_DISTINCT_NUMERIC && !label.all_in_unit_interval() {
            TaskType::Regression
        } else if distinct > 2 {
            TaskType::Multiclass
        } else {
            TaskType::Binary
        }
    } else if distinct > REGRESSION_DISTINCT_TEXT {
        TaskType::Regression
    } else {
        TaskType::Binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(dp: Option<f64>) -> FairnessAnalysis {
        FairnessAnalysis {
            protected_column: "g".into(),
            groups: Vec::new(),
            demographic_parity_difference: dp,
            disparate_impact_ratio: None,
            tpr_gap: None,
            fpr_gap: None,
        }
    }

    #[test]
    fn test_aggregate_uses_first_analysis() {
        assert_eq!(aggregate(&[analysis(Some(0.25)), analysis(Some(0.9))]), Some(75.0));
        assert_eq!(aggregate(&[analysis(None), analysis(Some(0.1))]), None);
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn test_score_is_bounded() {
        assert_eq!(score_from_dp_difference(0.0), 100.0);
        assert_eq!(score_from_dp_difference(1.0), 0.0);
        assert_eq!(score_from_dp_difference(1.5), 0.0);
    }

    #[test]
    fn test_classify_task() {
        assert_eq!(
            classify_task(&Column::from_numbers("y", &[0.0, 1.0, 1.0])),
            TaskType::Binary
        );
        assert_eq!(
            classify_task(&Column::from_numbers("y", &[0.0, 1.0, 2.0])),
            TaskType::Multiclass
        );

        let continuous: Vec<f64> = (0..60).map(|i| i as f64 * 1.5).collect();
        assert_eq!(
            classify_task(&Column::from_numbers("y", &continuous)),
            TaskType::Regression
        );

        let probabilities: Vec<f64> = (0..60).map(|i| i as f64 / 100.0).collect();
        assert_eq!(
            classify_task(&Column::from_numbers("y", &probabilities)),
            TaskType::Multiclass
        );

        let names: Vec<String> = (0..11).map(|i| format!("n{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(
            classify_task(&Column::from_text("y", &refs)),
            TaskType::Regression
        );
        assert_eq!(
            classify_task(&Column::from_text("y", &["yes", "no"])),
            TaskType::Binary
        );
    }
}
