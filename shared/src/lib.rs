pub mod models;
pub mod utils;

// Shared between the engine and anything that renders its reports.
// Only plain data and pure helpers live here; file access stays in the engine.

pub use models::{AnnualTotals, BudgetRecord, CapagGrade, CapagRecord, Ledger};
pub use utils::brazilian_format;
pub use utils::text::{normalize_label, normalize_optional, normalize_text};
