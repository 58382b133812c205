//! Per-group confusion statistics and disparity metrics for one protected column.

use super::binarize::BinaryDecisions;
use crate::domain::audit::{ConfusionCounts, FairnessAnalysis, GroupStat};
use crate::domain::table::{Column, Table, MISSING_GROUP};
use std::collections::HashMap;
use tracing::debug;

/// `numerator / denominator`, or `None` when the denominator is zero
pub fn safe_divide(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// `max - min` over the given values, or `None` when there are none
pub fn spread(values: &[f64]) -> Option<f64> {
    let (min, max) = min_max(values)?;
    Some(max - min)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}

/// Group statistics of `protected_column` against the binarized label and prediction.
pub fn analyze_protected(
    table: &Table,
    protected_column: &str,
    y_true: &BinaryDecisions,
    y_pred: &BinaryDecisions,
) -> FairnessAnalysis {
    let groups = match table.column(protected_column) {
        Some(column) if column.is_all_missing() => {
            debug!(
                column = protected_column,
                "Protected column has no observed values; group statistics undefined"
            );
            undefined_groups(column)
        }
        Some(column) => partition(column)
            .into_iter()
            .map(|(group, rows)| group_stat(group, &rows, y_true, y_pred))
            .collect(),
        None => Vec::new(),
    };

    summarize(protected_column, groups)
}

/// Row indices per group key, in order of first appearance
fn partition(column: &Column) -> Vec<(String, Vec<usize>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

    for (row, value) in column.values().iter().enumerate() {
        let key = value.group_key();
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    groups
}

fn undefined_groups(column: &Column) -> Vec<GroupStat> {
    if column.is_empty() {
        return Vec::new();
    }
    vec![GroupStat {
        group: MISSING_GROUP.to_string(),
        size: column.len(),
        selection_rate: None,
        confusion: None,
        tpr: None,
        fpr: None,
    }]
}

fn group_stat(
    group: String,
    rows: &[usize],
    y_true: &BinaryDecisions,
    y_pred: &BinaryDecisions,
) -> GroupStat {
    if rows.is_empty() {
        return GroupStat {
            group,
            size: 0,
            selection_rate: None,
            confusion: None,
            tpr: None,
            fpr: None,
        };
    }

    let predicted: Vec<u8> = rows
        .iter()
        .filter(|&&row| y_pred.is_observed(row))
        .filter_map(|&row| y_pred.get(row))
        .collect();
    let positives = predicted.iter().filter(|&&v| v == 1).count();
    let selection_rate = safe_divide(positives, predicted.len());

    let confusion = confusion_counts(rows, y_true, y_pred);

    GroupStat {
        group,
        size: rows.len(),
        selection_rate,
        tpr: safe_divide(confusion.tp, confusion.tp + confusion.fn_),
        fpr: safe_divide(confusion.fp, confusion.fp + confusion.tn),
        confusion: Some(confusion),
    }
}

/// Confusion counts over the fixed label set {0, 1}; rows missing either the
/// label or the prediction are skipped.
fn confusion_counts(rows: &[usize], y_true: &BinaryDecisions, y_pred: &BinaryDecisions) -> ConfusionCounts {
    let mut counts = ConfusionCounts::default();
    for &row in rows {
        if !(y_true.is_observed(row) && y_pred.is_observed(row)) {
            continue;
        }
        match (y_true.get(row), y_pred.get(row)) {
            (Some(1), Some(1)) => counts.tp += 1,
            (Some(0), Some(0)) => counts.tn += 1,
            (Some(0), Some(1)) => counts.fp += 1,
            (Some(1), Some(0)) => counts.fn_ += 1,
            _ => {}
        }
    }
    counts
}

fn summarize(protected_column: &str, groups: Vec<GroupStat>) -> FairnessAnalysis {
    let rates: Vec<f64> = groups.iter().filter_map(|g| g.selection_rate).collect();
    let tprs: Vec<f64> = groups.iter().filter_map(|g| g.tpr).collect();
    let fprs: Vec<f64> = groups.iter().filter_map(|g| g.fpr).collect();

    let disparate_impact_ratio = min_max(&rates)
        .filter(|(min, max)| *min > 0.0 && *max > 0.0)
        .map(|(min, max)| min / max);

    FairnessAnalysis {
        protected_column: protected_column.to_string(),
        demographic_parity_difference: spread(&rates),
        disparate_impact_ratio,
        tpr_gap: spread(&tprs),
        fpr_gap: spread(&fprs),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fairness::binarize::{binarize, DEFAULT_THRESHOLD};
    use crate::domain::table::CellValue;

    fn decisions(values: &[f64]) -> BinaryDecisions {
        binarize(&Column::from_numbers("x", values), None, DEFAULT_THRESHOLD)
    }

    fn group<'a>(analysis: &'a FairnessAnalysis, name: &str) -> &'a GroupStat {
        analysis.groups.iter().find(|g| g.group == name).unwrap()
    }

    #[test]
    fn test_safe_divide() {
        assert_eq!(safe_divide(1, 4), Some(0.25));
        assert_eq!(safe_divide(0, 0), None);
    }

    #[test]
    fn test_spread() {
        assert_eq!(spread(&[]), None);
        assert_eq!(spread(&[0.4]), Some(0.0));
        assert_eq!(spread(&[0.2, 0.9, 0.5]), Some(0.9 - 0.2));
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let table = Table::new(vec![
            Column::from_text("g", &["b", "a", "b", "c"]),
            Column::from_numbers("label", &[1.0, 0.0, 1.0, 0.0]),
        ])
        .unwrap();
        let y = decisions(&[1.0, 0.0, 1.0, 0.0]);
        let analysis = analyze_protected(&table, "g", &y, &y);
        let names: Vec<&str> = analysis.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_confusion_and_rates() {
        let table = Table::new(vec![
            Column::from_text("g", &["a", "a", "a", "a", "b", "b"]),
            Column::from_numbers("label", &[1.0, 1.0, 0.0, 0.0, 1.0, 0.0]),
            Column::from_numbers("pred", &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap();
        let y_true = decisions(&[1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        let y_pred = decisions(&[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let analysis = analyze_protected(&table, "g", &y_true, &y_pred);

        let a = group(&analysis, "a");
        assert_eq!(
            a.confusion,
            Some(ConfusionCounts {
                tp: 1,
                tn: 1,
                fp: 1,
                fn_: 1
            })
        );
        assert_eq!(a.selection_rate, Some(0.5));
        assert_eq!(a.tpr, Some(0.5));
        assert_eq!(a.fpr, Some(0.5));

        let b = group(&analysis, "b");
        assert_eq!(b.selection_rate, Some(1.0));
        assert_eq!(b.tpr, Some(1.0));
        assert_eq!(b.fpr, Some(1.0));

        assert_eq!(analysis.demographic_parity_difference, Some(0.5));
        assert_eq!(analysis.disparate_impact_ratio, Some(0.5));
        assert_eq!(analysis.tpr_gap, Some(0.5));
        assert_eq!(analysis.fpr_gap, Some(0.5));
    }

    #[test]
    fn test_single_class_partition_has_undefined_fpr() {
        let table = Table::new(vec![
            Column::from_text("g", &["a", "a"]),
            Column::from_numbers("label", &[1.0, 1.0]),
        ])
        .unwrap();
        let y = decisions(&[1.0, 1.0]);
        let analysis = analyze_protected(&table, "g", &y, &y);
        let a = group(&analysis, "a");
        assert_eq!(a.confusion.map(|c| c.tp), Some(2));
        assert_eq!(a.tpr, Some(1.0));
        assert_eq!(a.fpr, None);
        assert_eq!(analysis.fpr_gap, None);
    }

    #[test]
    fn test_single_group_with_zero_rate() {
        let table = Table::new(vec![
            Column::from_text("g", &["a", "a"]),
            Column::from_numbers("label", &[0.0, 0.0]),
        ])
        .unwrap();
        let y = decisions(&[0.0, 0.0]);
        let analysis = analyze_protected(&table, "g", &y, &y);
        assert_eq!(analysis.demographic_parity_difference, Some(0.0));
        assert_eq!(analysis.disparate_impact_ratio, None);
    }

    #[test]
    fn test_missing_values_form_their_own_group() {
        let table = Table::new(vec![
            Column::new(
                "g",
                vec![CellValue::from("a"), CellValue::Missing, CellValue::from("a")],
            ),
            Column::from_numbers("label", &[1.0, 0.0, 0.0]),
        ])
        .unwrap();
        let y = decisions(&[1.0, 0.0, 0.0]);
        let analysis = analyze_protected(&table, "g", &y, &y);
        let missing = group(&analysis, MISSING_GROUP);
        assert_eq!(missing.size, 1);
        assert_eq!(missing.selection_rate, Some(0.0));
    }

    #[test]
    fn test_confusion_skips_rows_missing_label_or_prediction() {
        let table = Table::new(vec![
            Column::from_text("g", &["a", "a", "a"]),
            Column::from_numbers("label", &[1.0, f64::NAN, 0.0]),
            Column::from_numbers("pred", &[1.0, 1.0, f64::NAN]),
        ])
        .unwrap();
        let y_true = decisions(&[1.0, f64::NAN, 0.0]);
        let y_pred = decisions(&[1.0, 1.0, f64::NAN]);
        let analysis = analyze_protected(&table, "g", &y_true, &y_pred);
        let a = group(&analysis, "a");
        assert_eq!(a.confusion.map(|c| c.total()), Some(1));
        assert_eq!(a.selection_rate, Some(1.0));
    }

    #[test]
    fn test_all_missing_protected_column() {
        let table = Table::new(vec![
            Column::new("g", vec![CellValue::Missing, CellValue::Missing]),
            Column::from_numbers("label", &[1.0, 0.0]),
        ])
        .unwrap();
        let y = decisions(&[1.0, 0.0]);
        let analysis = analyze_protected(&table, "g", &y, &y);
        assert_eq!(analysis.groups.len(), 1);
        let g = &analysis.groups[0];
        assert_eq!(g.selection_rate, None);
        assert_eq!(g.confusion, None);
        assert_eq!(analysis.demographic_parity_difference, None);
        assert_eq!(analysis.disparate_impact_ratio, None);
        assert_eq!(analysis.tpr_gap, None);
        assert_eq!(analysis.fpr_gap, None);
    }
}
