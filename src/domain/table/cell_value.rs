// ============================================================
// CELL VALUE
// ============================================================
// A single table cell: numeric, text, or missing

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Group label used for missing protected-attribute values
pub const MISSING_GROUP: &str = "MISSING";

/// One cell of an uploaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text form used for grouping and cross-type comparison.
    /// Integral numbers drop the fractional part so `1` and `1.0` group together.
    pub fn group_key(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Missing => MISSING_GROUP.to_string(),
        }
    }

    /// Equality against a chosen positive class. Numbers compare numerically,
    /// anything else compares by text form. Missing never matches.
    pub fn matches(&self, positive: &CellValue) -> bool {
        match (self, positive) {
            (CellValue::Missing, _) | (_, CellValue::Missing) => false,
            (CellValue::Number(a), CellValue::Number(b)) => a == b,
            (a, b) => a.group_key() == b.group_key(),
        }
    }

    /// Total order used to break frequency ties deterministically.
    pub(crate) fn tie_break_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Number(_), _) => Ordering::Less,
            (_, CellValue::Number(_)) => Ordering::Greater,
            (a, b) => a.group_key().cmp(&b.group_key()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            CellValue::Missing
        } else {
            CellValue::Number(value)
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
