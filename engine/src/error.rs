use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {source}")]
    SpreadsheetError {
        #[from]
        source: calamine::Error,
    },

    #[error("Request is not valid UTF-8: {source}")]
    RequestEncodingError {
        #[from]
        source: std::str::Utf8Error,
    },

    #[error("Invalid input pattern: {source}")]
    GlobPatternError {
        #[from]
        source: glob::PatternError,
    },

    #[error("Cannot read input entry: {source}")]
    GlobError {
        #[from]
        source: glob::GlobError,
    },

    #[error("No input files matching '{pattern}'")]
    NoInputFiles { pattern: String },

    #[error("Required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    // Catch-all for helpers from the shared crate, which report through anyhow.
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    /// Short machine-readable tag, used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::ConfigError(_) => "config",
            EngineError::CsvSystemError { .. } => "csv",
            EngineError::IoError { .. } => "io",
            EngineError::SpreadsheetError { .. } => "spreadsheet",
            EngineError::RequestEncodingError { .. } => "request_encoding",
            EngineError::GlobPatternError { .. } | EngineError::GlobError { .. } => "input_pattern",
            EngineError::NoInputFiles { .. } => "no_input_files",
            EngineError::MissingFile { .. } => "missing_file",
            EngineError::CsvDataFormatError(_) => "csv_data_format",
            EngineError::JsonError { .. } => "json",
            EngineError::ProcessingError(_) => "processing",
            EngineError::AnyhowError(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_mentions_path() {
        let err = EngineError::MissingFile { path: PathBuf::from("capag_full.csv") };
        assert_eq!(err.to_string(), "Required file not found: capag_full.csv");
        assert_eq!(err.kind(), "missing_file");
    }

    #[test]
    fn utf8_errors_convert() {
        let bytes = b"{\"type\":\"list_states\xe3\"}";
        let err: EngineError = std::str::from_utf8(bytes).unwrap_err().into();
        assert_eq!(err.kind(), "request_encoding");
        assert!(err.to_string().starts_with("Request is not valid UTF-8"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EngineError = io.into();
        assert!(err.to_string().starts_with("I/O error"));
        assert_eq!(err.kind(), "io");
    }
}
