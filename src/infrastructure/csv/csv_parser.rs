// ============================================================
// CSV PARSER
// ============================================================
// Uploaded bytes -> typed Table with encoding and delimiter detection

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, Column, Table};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;

/// Cells read as missing regardless of column type
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "-"];

const TRUE_MARKERS: &[&str] = &["True", "TRUE", "true"];
const FALSE_MARKERS: &[&str] = &["False", "FALSE", "false"];

/// Maximum number of data rows accepted
const MAX_ROWS: usize = 5_000_000;

/// CSV parser producing a column-typed `Table`. The delimiter is detected from
/// the first lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode and parse raw upload bytes
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let content = decode(bytes);
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        if content.trim().is_empty() {
            return Err(AppError::ParseError("No columns to parse from file".to_string()));
        }

        let delimiter = Self::detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();
        let names = mangle_headers(headers.iter());
        let width = names.len();

        let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); width];
        for (index, result) in reader.records().enumerate() {
            if index >= MAX_ROWS {
                return Err(AppError::ParseError(format!("CSV exceeds {} rows", MAX_ROWS)));
            }
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            if record.len() > width {
                return Err(AppError::ParseError(format!(
                    "Row {} has {} fields, expected {}",
                    index + 1,
                    record.len(),
                    width
                )));
            }
            for (idx, column) in raw_columns.iter_mut().enumerate() {
                column.push(record.get(idx).unwrap_or("").to_string());
            }
        }

        let columns = names
            .into_iter()
            .zip(raw_columns)
            .map(|(name, cells)| Column::new(name, infer_cells(&cells)))
            .collect();

        Table::new(columns)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// UTF-8 (BOM stripped), falling back to Windows-1252
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

/// Blank headers become `Unnamed: {i}`; repeats get `.1`, `.2`, ...
fn mangle_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for (idx, header) in headers.enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw)
}

/// Whole-column typing: all observed cells numeric -> numbers, all boolean
/// words -> 1/0, otherwise text.
fn infer_cells(raw: &[String]) -> Vec<CellValue> {
    let observed: Vec<&str> = raw
        .iter()
        .map(String::as_str)
        .filter(|v| !is_missing(v))
        .collect();

    let numeric = observed.iter().all(|v| v.parse::<f64>().is_ok());
    let boolean = !observed.is_empty()
        && observed
            .iter()
            .all(|v| TRUE_MARKERS.contains(v) || FALSE_MARKERS.contains(v));

    raw.iter()
        .map(|v| {
            if is_missing(v) {
                CellValue::Missing
            } else if numeric {
                v.parse::<f64>().map(CellValue::from).unwrap_or(CellValue::Missing)
            } else if boolean {
                CellValue::Number(if TRUE_MARKERS.contains(&v.as_str()) { 1.0 } else { 0.0 })
            } else {
                CellValue::Text(v.clone())
            }
        })
        .collect()
}
