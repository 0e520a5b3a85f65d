pub mod budget_store;
pub mod csv_parser;
pub mod dataset;
pub mod spreadsheets;
