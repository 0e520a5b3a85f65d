// Engine library root: ingestion, derivation and the report service.

pub mod analysis;
pub mod capag;
pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use config::EngineSettings;
pub use data::dataset::BudgetDataset;
pub use error::EngineError;
pub use services::BudgetReportService;
