//! Column role detection.
//!
//! Each stage is an ordered rule table: the first rule whose predicate picks a
//! column decides the outcome. Detection is purely heuristic.

use crate::domain::audit::{DetectedRoles, LabelReason};
use crate::domain::error::{AppError, Result};
use crate::domain::table::{Column, Table};
use tracing::debug;

const LABEL_NAMES: &[&str] = &["label", "target", "y", "y_true", "ground_truth", "true"];

const PREDICTION_NAMES: &[&str] = &["y_pred", "pred", "prediction", "yhat", "score", "prob"];

const PROTECTED_NAMES: &[&str] = &[
    "gender",
    "sex",
    "race",
    "ethnicity",
    "age",
    "zipcode",
    "zip",
    "country",
    "region",
    "religion",
    "disability",
];

struct LabelRule {
    reason: LabelReason,
    pick: for<'a> fn(&'a Table) -> Option<&'a Column>,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        reason: LabelReason::NameMatch,
        pick: label_by_name,
    },
    LabelRule {
        reason: LabelReason::Heuristic,
        pick: label_by_structure,
    },
];

struct ProtectedRule {
    name: &'static str,
    qualifies: fn(&Column, usize) -> bool,
}

const PROTECTED_RULES: &[ProtectedRule] = &[
    ProtectedRule {
        name: "protected_name",
        qualifies: protected_by_name,
    },
    ProtectedRule {
        name: "low_cardinality",
        qualifies: protected_by_cardinality,
    },
];

/// Assign label, prediction and protected roles to the columns of `table`.
pub fn detect_roles(table: &Table) -> Result<DetectedRoles> {
    if table.column_count() < 2 {
        return Err(AppError::InputError(
            "Data must have at least 2 columns.".to_string(),
        ));
    }

    let (label, label_reason) = detect_label(table);
    let prediction = detect_prediction(table).filter(|p| *p != label);

    let mut exclude = vec![label.as_str()];
    if let Some(p) = prediction.as_deref() {
        exclude.push(p);
    }
    let protected = detect_protected(table, &exclude);

    debug!(
        label = %label,
        reason = ?label_reason,
        prediction = ?prediction,
        protected = ?protected,
        "Detected column roles"
    );

    let roles = DetectedRoles {
        label,
        label_reason,
        prediction,
        protected,
    };
    for column in table.columns() {
        debug!(column = column.name(), role = ?roles.role_of(column.name()), "Column role");
    }
    Ok(roles)
}

/// Label column and how it was found. Falls back to the last column with
/// `NotFound`; callers proceed either way.
pub fn detect_label(table: &Table) -> (String, LabelReason) {
    for rule in LABEL_RULES {
        if let Some(column) = (rule.pick)(table) {
            return (column.name().to_string(), rule.reason);
        }
    }

    let fallback = table
        .columns()
        .last()
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    (fallback, LabelReason::NotFound)
}

fn label_by_name(table: &Table) -> Option<&Column> {
    table
        .columns()
        .iter()
        .find(|c| LABEL_NAMES.contains(&c.lowercase_name().as_str()))
}

fn label_by_structure(table: &Table) -> Option<&Column> {
    let columns = table.columns();
    [columns.last(), columns.first()]
        .into_iter()
        .flatten()
        .find(|c| is_label_like(c))
}

fn is_label_like(column: &Column) -> bool {
    !column.is_all_missing()
        && column.is_numeric()
        && (column.distinct_count() <= 2 || column.all_in_unit_interval())
}

/// First column, in table order, named like a model output
pub fn detect_prediction(table: &Table) -> Option<String> {
    table
        .columns()
        .iter()
        .find(|c| PREDICTION_NAMES.contains(&c.lowercase_name().as_str()))
        .map(|c| c.name().to_string())
}

/// Protected-attribute candidates in column order, excluding `exclude`.
/// Falls back to the first non-excluded column when nothing qualifies.
pub fn detect_protected(table: &Table, exclude: &[&str]) -> Vec<String> {
    let row_count = table.row_count();
    let candidates: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| !exclude.contains(&c.name()))
        .collect();

    let mut protected: Vec<String> = Vec::new();
    for column in &candidates {
        let matched = PROTECTED_RULES
            .iter()
            .find(|rule| (rule.qualifies)(column, row_count));
        if let Some(rule) = matched {
            debug!(column = column.name(), rule = rule.name, "Protected column candidate");
            if !protected.iter().any(|p| p == column.name()) {
                protected.push(column.name().to_string());
            }
        }
    }

    if protected.is_empty() {
        if let Some(first) = candidates.first() {
            protected.push(first.name().to_string());
        }
    }

    protected
}

fn protected_by_name(column: &Column, _row_count: usize) -> bool {
    PROTECTED_NAMES.contains(&column.lowercase_name().as_str())
}

fn protected_by_cardinality(column: &Column, row_count: usize) -> bool {
    column.distinct_count() <= cardinality_limit(row_count)
}

/// Largest distinct-value count still treated as categorical
pub fn cardinality_limit(row_count: usize) -> usize {
    let scaled = (row_count as f64 * 0.02) as usize;
    scaled.clamp(10, 50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::ColumnRole;
    use crate::domain::table::CellValue;

    fn table(columns: Vec<Column>) -> Table {
        Table::new(columns).unwrap()
    }

    fn ids(n: usize) -> Column {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Column::from_numbers("id", &values)
    }

    #[test]
    fn test_requires_two_columns() {
        let t = table(vec![Column::from_numbers("label", &[1.0, 0.0])]);
        assert!(matches!(detect_roles(&t), Err(AppError::InputError(_))));
    }

    #[test]
    fn test_label_name_match_is_case_insensitive() {
        let t = table(vec![
            Column::from_numbers("Target", &[1.0, 0.0]),
            Column::from_text("group", &["a", "b"]),
        ]);
        assert_eq!(
            detect_label(&t),
            ("Target".to_string(), LabelReason::NameMatch)
        );
    }

    #[test]
    fn test_label_heuristic_prefers_last_column() {
        let t = table(vec![
            Column::from_numbers("first", &[0.0, 1.0, 1.0]),
            Column::from_text("group", &["a", "b", "a"]),
            Column::from_numbers("outcome", &[1.0, 0.0, 1.0]),
        ]);
        assert_eq!(
            detect_label(&t),
            ("outcome".to_string(), LabelReason::Heuristic)
        );
    }

    #[test]
    fn test_label_heuristic_falls_back_to_first_column() {
        let t = table(vec![
            Column::from_numbers("approved", &[0.2, 0.9, 0.4]),
            Column::from_text("group", &["a", "b", "a"]),
        ]);
        assert_eq!(
            detect_label(&t),
            ("approved".to_string(), LabelReason::Heuristic)
        );
    }

    #[test]
    fn test_label_heuristic_skips_all_missing_column() {
        let t = table(vec![
            Column::from_numbers("first", &[1.0, 0.0]),
            Column::new("empty", vec![CellValue::Missing, CellValue::Missing]),
        ]);
        assert_eq!(detect_label(&t), ("first".to_string(), LabelReason::Heuristic));
    }

    #[test]
    fn test_label_not_found_defaults_to_last_column() {
        let t = table(vec![
            Column::from_text("name", &["x", "y", "z"]),
            Column::from_numbers("income", &[10.0, 20.0, 30.0]),
        ]);
        assert_eq!(detect_label(&t), ("income".to_string(), LabelReason::NotFound));
    }

    #[test]
    fn test_prediction_detection() {
        let t = table(vec![
            Column::from_numbers("y_true", &[1.0, 0.0]),
            Column::from_numbers("Score", &[0.3, 0.8]),
            Column::from_numbers("pred", &[1.0, 0.0]),
        ]);
        assert_eq!(detect_prediction(&t), Some("Score".to_string()));
    }

    #[test]
    fn test_label_and_prediction_never_protected() {
        let t = table(vec![
            Column::from_text("gender", &["f", "m", "f"]),
            Column::from_numbers("pred", &[1.0, 0.0, 1.0]),
            Column::from_numbers("label", &[1.0, 1.0, 0.0]),
        ]);
        let roles = detect_roles(&t).unwrap();
        assert_eq!(roles.label, "label");
        assert_eq!(roles.prediction.as_deref(), Some("pred"));
        assert_eq!(roles.protected, vec!["gender".to_string()]);
    }

    #[test]
    fn test_name_matched_protected_ignores_cardinality() {
        let n = 40;
        let ages: Vec<f64> = (0..n).map(|i| 20.0 + i as f64).collect();
        let labels: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let t = table(vec![
            ids(n),
            Column::from_numbers("Age", &ages),
            Column::from_numbers("label", &labels),
        ]);
        let roles = detect_roles(&t).unwrap();
        assert_eq!(roles.protected, vec!["Age".to_string()]);
    }

    #[test]
    fn test_protected_keeps_column_order_across_rules() {
        let t = table(vec![
            Column::from_text("income_bucket", &["low", "high", "mid", "low"]),
            Column::from_text("gender", &["f", "m", "f", "m"]),
            Column::from_numbers("label", &[1.0, 0.0, 1.0, 0.0]),
        ]);
        let roles = detect_roles(&t).unwrap();
        assert_eq!(
            roles.protected,
            vec!["income_bucket".to_string(), "gender".to_string()]
        );
        assert_eq!(roles.role_of("income_bucket"), ColumnRole::Protected);
        assert_eq!(roles.role_of("label"), ColumnRole::Label);
    }

    #[test]
    fn test_protected_falls_back_to_first_non_excluded_column() {
        let n = 30;
        let labels: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let t = table(vec![ids(n), Column::from_numbers("label", &labels)]);
        let roles = detect_roles(&t).unwrap();
        assert_eq!(roles.protected, vec!["id".to_string()]);
    }

    #[test]
    fn test_cardinality_limit() {
        assert_eq!(cardinality_limit(0), 10);
        assert_eq!(cardinality_limit(1000), 20);
        assert_eq!(cardinality_limit(100_000), 50);
    }
}
