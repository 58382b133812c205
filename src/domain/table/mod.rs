// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// In-memory tabular data audited for fairness
// No I/O, no async

mod cell_value;
mod column;
#[allow(clippy::module_inception)]
mod table;

pub use cell_value::{CellValue, MISSING_GROUP};
pub use column::Column;
pub use table::Table;
