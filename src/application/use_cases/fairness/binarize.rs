//! Column binarization.
//!
//! The policy is an ordered rule table evaluated top to bottom; the first rule
//! whose predicate accepts the column decides how every cell maps to 0/1.

use crate::domain::table::{CellValue, Column};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Distinct-value bound above which a numeric column is never treated as 0/1
const BINARY_CANDIDATE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarizePolicy {
    /// No observed values; every row is 0
    AllMissing,
    /// Values already in {0, 1}
    BinaryCast,
    /// Scores in [0, 1], cut at the threshold
    Probability,
    /// Equality with the positive class
    PositiveClass,
    /// Text equality with the positive class
    Categorical,
}

struct BinarizeRule {
    policy: BinarizePolicy,
    applies: fn(&Column) -> bool,
}

const BINARIZE_RULES: &[BinarizeRule] = &[
    BinarizeRule {
        policy: BinarizePolicy::AllMissing,
        applies: Column::is_all_missing,
    },
    BinarizeRule {
        policy: BinarizePolicy::BinaryCast,
        applies: is_zero_one,
    },
    BinarizeRule {
        policy: BinarizePolicy::Probability,
        applies: is_probability,
    },
    BinarizeRule {
        policy: BinarizePolicy::PositiveClass,
        applies: Column::is_numeric,
    },
    BinarizeRule {
        policy: BinarizePolicy::Categorical,
        applies: any_column,
    },
];

fn is_zero_one(column: &Column) -> bool {
    if !column.is_numeric() {
        return false;
    }
    let distinct = column.distinct_numbers();
    distinct.len() <= 2 && distinct.iter().all(|v| *v == 0.0 || *v == 1.0)
}

fn is_probability(column: &Column) -> bool {
    column.is_numeric() && column.all_in_unit_interval()
}

fn any_column(_column: &Column) -> bool {
    true
}

/// Per-row 0/1 decisions plus which rows carried a value in the source column
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDecisions {
    values: Vec<u8>,
    observed: Vec<bool>,
    policy: BinarizePolicy,
}

impl BinaryDecisions {
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn policy(&self) -> BinarizePolicy {
        self.policy
    }

    pub fn is_observed(&self, row: usize) -> bool {
        self.observed.get(row).copied().unwrap_or(false)
    }

    pub fn get(&self, row: usize) -> Option<u8> {
        self.values.get(row).copied()
    }
}

/// The first rule in the table that accepts `column`
pub fn select_policy(column: &Column) -> BinarizePolicy {
    BINARIZE_RULES
        .iter()
        .find(|rule| (rule.applies)(column))
        .map(|rule| rule.policy)
        .unwrap_or(BinarizePolicy::Categorical)
}

/// Convert `column` into 0/1 decisions. Missing cells map to 0 and are
/// flagged unobserved.
pub fn binarize(
    column: &Column,
    positive_class: Option<&CellValue>,
    threshold: f64,
) -> BinaryDecisions {
    let policy = select_policy(column);
    let cells = column.values();

    let values: Vec<u8> = match policy {
        BinarizePolicy::AllMissing => vec![0; cells.len()],
        BinarizePolicy::BinaryCast => cells
            .iter()
            .map(|v| u8::from(v.as_number() == Some(1.0)))
            .collect(),
        BinarizePolicy::Probability => threshold_at(cells, threshold),
        // the column has an observed value here, so it always has a mode
        BinarizePolicy::PositiveClass | BinarizePolicy::Categorical => {
            match positive_class.cloned().or_else(|| column.mode()) {
                Some(positive) => match_positive(cells, &positive),
                None => vec![0; cells.len()],
            }
        }
    };

    BinaryDecisions {
        values,
        observed: cells.iter().map(|v| !v.is_missing()).collect(),
        policy,
    }
}

fn threshold_at(cells: &[CellValue], threshold: f64) -> Vec<u8> {
    cells
        .iter()
        .map(|v| u8::from(v.as_number().map(|n| n >= threshold).unwrap_or(false)))
        .collect()
}

fn match_positive(cells: &[CellValue], positive: &CellValue) -> Vec<u8> {
    cells.iter().map(|v| u8::from(v.matches(positive))).collect()
}

/// Positive class derived from the label column and reused for the prediction
/// column. `None` leaves the choice to the binarizer (threshold or mode).
pub fn choose_positive_class(label: &Column) -> Option<CellValue> {
    if label.is_all_missing() {
        return None;
    }

    if label.is_numeric() {
        let distinct = label.distinct_numbers();
        let zero_one = distinct.len() < BINARY_CANDIDATE_LIMIT
            && distinct.iter().all(|v| *v == 0.0 || *v == 1.0);
        return zero_one.then_some(CellValue::Number(1.0));
    }

    label.mode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_missing_column_is_all_zero() {
        let col = Column::new("x", vec![CellValue::Missing, CellValue::Missing]);
        let decisions = binarize(&col, None, DEFAULT_THRESHOLD);
        assert_eq!(decisions.values(), &[0, 0]);
        assert_eq!(decisions.policy(), BinarizePolicy::AllMissing);
        assert!(!decisions.is_observed(0));
    }

    #[test]
    fn test_binary_cast() {
        let col = Column::from_numbers("x", &[1.0, 0.0, f64::NAN, 1.0]);
        let decisions = binarize(&col, None, DEFAULT_THRESHOLD);
        assert_eq!(decisions.policy(), BinarizePolicy::BinaryCast);
        assert_eq!(decisions.values(), &[1, 0, 0, 1]);
        assert!(!decisions.is_observed(2));
    }

    #[test]
    fn test_single_valued_binary_column() {
        let col = Column::from_numbers("x", &[1.0, 1.0]);
        assert_eq!(select_policy(&col), BinarizePolicy::BinaryCast);
    }

    #[test]
    fn test_probability_threshold() {
        let col = Column::from_numbers("score", &[0.1, 0.5, 0.9, 0.49]);
        let decisions = binarize(&col, None, DEFAULT_THRESHOLD);
        assert_eq!(decisions.policy(), BinarizePolicy::Probability);
        assert_eq!(decisions.values(), &[0, 1, 1, 0]);

        let strict = binarize(&col, None, 0.95);
        assert_eq!(strict.values(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_numeric_uses_mode_as_positive_class() {
        let col = Column::from_numbers("grade", &[3.0, 2.0, 3.0, 5.0]);
        let decisions = binarize(&col, None, DEFAULT_THRESHOLD);
        assert_eq!(decisions.policy(), BinarizePolicy::PositiveClass);
        assert_eq!(decisions.values(), &[1, 0, 1, 0]);
    }

    #[test]
    fn test_numeric_uses_supplied_positive_class() {
        let col = Column::from_numbers("grade", &[3.0, 2.0, 3.0, 5.0]);
        let positive = CellValue::Number(5.0);
        let decisions = binarize(&col, Some(&positive), DEFAULT_THRESHOLD);
        assert_eq!(decisions.values(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_categorical() {
        let col = Column::from_text("outcome", &["approved", "denied", "approved"]);
        let decisions = binarize(&col, None, DEFAULT_THRESHOLD);
        assert_eq!(decisions.policy(), BinarizePolicy::Categorical);
        assert_eq!(decisions.values(), &[1, 0, 1]);

        let positive = CellValue::from("denied");
        let flipped = binarize(&col, Some(&positive), DEFAULT_THRESHOLD);
        assert_eq!(flipped.values(), &[0, 1, 0]);
    }

    #[test]
    fn test_choose_positive_class() {
        assert_eq!(
            choose_positive_class(&Column::from_numbers("y", &[0.0, 1.0])),
            Some(CellValue::Number(1.0))
        );
        assert_eq!(
            choose_positive_class(&Column::from_numbers("y", &[0.2, 0.7, 0.9])),
            None
        );
        assert_eq!(
            choose_positive_class(&Column::from_numbers("y", &[1.0, 2.0, 3.0])),
            None
        );
        assert_eq!(
            choose_positive_class(&Column::from_text("y", &["yes", "no", "yes"])),
            Some(CellValue::from("yes"))
        );
        assert_eq!(
            choose_positive_class(&Column::new("y", vec![CellValue::Missing])),
            None
        );
    }
}
