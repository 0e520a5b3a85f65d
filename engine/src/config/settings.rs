// Engine settings, loaded from a JSON config file or defaulted
use crate::error::EngineError;
use budget_shared::brazilian_format::DecimalNotation;
use budget_shared::{normalize_text, Ledger};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON config file, used when no path is given.
pub const CONFIG_ENV_VAR: &str = "BUDGET_ENGINE_CONFIG";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputEncoding {
    /// ISO-8859-1, what Siconfi extracts are published in.
    Latin1,
    Utf8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LedgerSettings {
    pub input_dir: PathBuf,
    /// Raw account label; normalized before matching.
    pub reference_account: String,
    /// Leading rows dropped from the latest-year ranking (aggregate lines).
    pub skip_top_shares: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub revenue: LedgerSettings,
    pub expenditure: LedgerSettings,
    /// Workbook (`.xlsx`, `.xls`, `.ods`) or delimited export of the yearly totals.
    pub annual_totals_path: PathBuf,
    pub capag_path: PathBuf,
    pub input_encoding: InputEncoding,
    pub input_delimiter: char,
    /// Only used when a spreadsheet input is a delimited export.
    pub spreadsheet_delimiter: char,
    /// Notation of numbers stored as text in the spreadsheet inputs.
    pub spreadsheet_decimal: DecimalNotation,
    /// Years covered by account-evolution queries, inclusive.
    pub year_range: YearRange,
    pub population_year: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            revenue: LedgerSettings {
                input_dir: PathBuf::from("./Receitas/"),
                reference_account: "RECEITA CORRENTE LÍQUIDA (III) = (I - II)".to_string(),
                skip_top_shares: 4,
            },
            expenditure: LedgerSettings {
                input_dir: PathBuf::from("./Despesas/"),
                reference_account: "DESPESAS (EXCETO INTRA-ORÇAMENTÁRIAS) (I)".to_string(),
                skip_top_shares: 1,
            },
            annual_totals_path: PathBuf::from("rec_desp_full.xlsx"),
            capag_path: PathBuf::from("capag_full.xlsx"),
            input_encoding: InputEncoding::Latin1,
            input_delimiter: ';',
            spreadsheet_delimiter: ',',
            spreadsheet_decimal: DecimalNotation::Plain,
            year_range: YearRange { start: 2015, end: 2023 },
            population_year: 2023,
        }
    }
}

impl EngineSettings {
    /// Explicit path first, then `BUDGET_ENGINE_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(env_path) => Self::from_json_file(Path::new(&env_path)),
                None => {
                    tracing::debug!("No config file given, using default settings");
                    let settings = Self::default();
                    settings.validate()?;
                    Ok(settings)
                }
            },
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("Cannot read config file '{}': {}", path.display(), e))
        })?;
        let settings: EngineSettings = serde_json::from_str(&content).map_err(|e| {
            EngineError::ConfigError(format!("Invalid config file '{}': {}", path.display(), e))
        })?;
        settings.validate()?;
        tracing::info!(path = %path.display(), "Loaded engine settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        Self::delimiter_byte(self.input_delimiter)?;
        Self::delimiter_byte(self.spreadsheet_delimiter)?;
        if self.year_range.start > self.year_range.end {
            return Err(EngineError::ConfigError(format!(
                "Year range start {} is after end {}",
                self.year_range.start, self.year_range.end
            )));
        }
        for ledger in [Ledger::Revenue, Ledger::Expenditure] {
            if self.reference_account(ledger).is_empty() {
                return Err(EngineError::ConfigError(format!(
                    "Reference account for {} is empty after normalization",
                    ledger
                )));
            }
        }
        Ok(())
    }

    pub fn ledger(&self, ledger: Ledger) -> &LedgerSettings {
        match ledger {
            Ledger::Revenue => &self.revenue,
            Ledger::Expenditure => &self.expenditure,
        }
    }

    /// Normalized reference account name of a ledger.
    pub fn reference_account(&self, ledger: Ledger) -> String {
        normalize_text(&self.ledger(ledger).reference_account)
    }

    pub fn input_delimiter_byte(&self) -> Result<u8, EngineError> {
        Self::delimiter_byte(self.input_delimiter)
    }

    pub fn spreadsheet_delimiter_byte(&self) -> Result<u8, EngineError> {
        Self::delimiter_byte(self.spreadsheet_delimiter)
    }

    fn delimiter_byte(delimiter: char) -> Result<u8, EngineError> {
        if delimiter.is_ascii() && !delimiter.is_ascii_alphanumeric() {
            Ok(delimiter as u8)
        } else {
            Err(EngineError::ConfigError(format!("Unsupported delimiter '{}'", delimiter)))
        }
    }
}
