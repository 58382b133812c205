// ============================================================
// COLUMN
// ============================================================
// Named, ordered column of cells plus the structural statistics
// the role detector and binarizer rely on

use super::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Numeric column; `NaN` entries become missing
    pub fn from_numbers(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    pub fn from_text(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased name used by every name-matching heuristic
    pub fn lowercase_name(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-missing cells in table order
    pub fn observed(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    pub fn is_all_missing(&self) -> bool {
        self.observed().next().is_none()
    }

    /// A column is numeric when every observed cell is a number.
    /// An all-missing column counts as numeric, like a float column of NaN.
    pub fn is_numeric(&self) -> bool {
        self.observed().all(|v| matches!(v, CellValue::Number(_)))
    }

    /// Observed numeric cells in table order
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_number).collect()
    }

    /// Distinct observed values, compared by their group key
    pub fn distinct_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for value in self.observed() {
            seen.insert(value.group_key());
        }
        seen.len()
    }

    /// Sorted distinct observed numbers
    pub fn distinct_numbers(&self) -> Vec<f64> {
        let mut numbers = self.numbers();
        numbers.sort_by(|a, b| a.total_cmp(b));
        numbers.dedup();
        numbers
    }

    /// True when every observed number lies in `[0, 1]` (vacuously true when empty)
    pub fn all_in_unit_interval(&self) -> bool {
        self.numbers().iter().all(|n| (0.0..=1.0).contains(n))
    }

    /// Most frequent observed value; ties resolve to the smallest value
    pub fn mode(&self) -> Option<CellValue> {
        let mut counts: HashMap<String, (usize, &CellValue)> = HashMap::new();
        for value in self.observed() {
            counts.entry(value.group_key()).or_insert((0, value)).0 += 1;
        }

        counts
            .into_values()
            .max_by(|(count_a, a), (count_b, b)| {
                count_a.cmp(count_b).then_with(|| b.tie_break_cmp(a))
            })
            .map(|(_, value)| value.clone())
    }

}
