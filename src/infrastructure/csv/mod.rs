// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV decoding, delimiter detection, and column typing

mod csv_parser;

pub use csv_parser::{decode, CsvParser, MISSING_MARKERS};
