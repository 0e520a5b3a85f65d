use crate::config::{EngineSettings, InputEncoding};
use crate::error::EngineError;
use budget_shared::brazilian_format;
use budget_shared::{normalize_label, normalize_text, BudgetRecord, Ledger};
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};

// Character decoding of the raw extract bytes
pub mod encoding {
    use crate::config::InputEncoding;
    use crate::error::EngineError;

    pub fn decode(bytes: &[u8], encoding: InputEncoding) -> Result<String, EngineError> {
        match encoding {
            // Every Latin-1 byte is the code point of the same value.
            InputEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            InputEncoding::Utf8 => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| EngineError::CsvDataFormatError(format!("Input is not valid UTF-8: {}", e)))?;
                Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_decode_latin1() {
            // "Instituição" in ISO-8859-1
            let bytes = b"Institui\xe7\xe3o";
            assert_eq!(decode(bytes, InputEncoding::Latin1).unwrap(), "Instituição");
        }

        #[test]
        fn test_decode_utf8_strips_bom() {
            let bytes = "\u{feff}Ano;Conta".as_bytes();
            assert_eq!(decode(bytes, InputEncoding::Utf8).unwrap(), "Ano;Conta");
        }

        #[test]
        fn test_decode_utf8_rejects_latin1() {
            assert!(decode(b"Institui\xe7\xe3o", InputEncoding::Utf8).is_err());
        }
    }
}

/// Positions of the columns the engine reads, found by normalized header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    year: usize,
    account: usize,
    value: usize,
    state: usize,
    institution: usize,
    population: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, EngineError> {
        let normalized: Vec<String> = headers.iter().map(normalize_text).collect();
        let find = |name: &str| normalized.iter().position(|header| header == name);
        let require = |label: &str, name: &str| {
            find(name).ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing required column '{}'", label)))
        };

        Ok(ColumnLayout {
            year: require("Ano", "ANO")?,
            account: require("Conta", "CONTA")?,
            value: require("Valor", "VALOR")?,
            state: require("UF", "UF")?,
            institution: require("Instituição", "INSTITUICAO")?,
            population: find("POPULACAO"),
        })
    }
}

/// Records of one file plus the number of rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFile {
    pub records: Vec<BudgetRecord>,
    pub skipped_rows: usize,
}

/// Reader for Siconfi-style revenue/expenditure extracts.
///
/// Header: `...;UF;...;Instituição;...;Conta;...;Ano;Valor[;População]`, any order.
/// Example row: `SP;PREFEITURA DE CAMPINAS;Impostos;2023;1.234.567,89`
pub struct BudgetCsvParser {
    ledger: Ledger,
    delimiter: u8,
    encoding: InputEncoding,
}

impl BudgetCsvParser {
    pub fn new(ledger: Ledger, delimiter: u8, encoding: InputEncoding) -> Self {
        BudgetCsvParser { ledger, delimiter, encoding }
    }

    pub fn from_settings(ledger: Ledger, settings: &EngineSettings) -> Result<Self, EngineError> {
        Ok(Self::new(ledger, settings.input_delimiter_byte()?, settings.input_encoding))
    }

    /// Loads every `*.csv` in `dir`, in file-name order.
    ///
    /// Files missing a required column are skipped with a warning; a directory
    /// without any CSV file is an error.
    pub fn load_records_from_dir(&self, dir: &Path) -> Result<Vec<BudgetRecord>, EngineError> {
        let pattern = format!("{}/*.csv", glob::Pattern::escape(&dir.to_string_lossy()));
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)?.collect::<Result<_, _>>()?;
        paths.sort();
        if paths.is_empty() {
            return Err(EngineError::NoInputFiles { pattern });
        }

        let mut records = Vec::new();
        let mut skipped_rows = 0;
        for path in &paths {
            match self.load_records_from_csv(path) {
                Ok(parsed) => {
                    skipped_rows += parsed.skipped_rows;
                    records.extend(parsed.records);
                }
                Err(EngineError::CsvDataFormatError(msg)) => {
                    tracing::warn!(ledger = %self.ledger, path = %path.display(), reason = %msg, "Skipping input file");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            ledger = %self.ledger,
            files = paths.len(),
            records = records.len(),
            skipped_rows,
            "Loaded budget extracts"
        );
        Ok(records)
    }

    pub fn load_records_from_csv(&self, path: &Path) -> Result<ParsedFile, EngineError> {
        let bytes = fs::read(path)?;
        let content = encoding::decode(&bytes, self.encoding)?;
        let parsed = self.parse_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            records = parsed.records.len(),
            skipped_rows = parsed.skipped_rows,
            "Parsed budget extract"
        );
        Ok(parsed)
    }

    pub fn parse_str(&self, content: &str) -> Result<ParsedFile, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers)?;

        let mut parsed = ParsedFile::default();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(line, error = %e, "Skipping unreadable row");
                    parsed.skipped_rows += 1;
                    continue;
                }
            };
            if record.len() > headers.len() {
                tracing::debug!(line, fields = record.len(), expected = headers.len(), "Skipping row with extra fields");
                parsed.skipped_rows += 1;
                continue;
            }
            match self.build_record(&record, &layout) {
                Some(budget_record) => parsed.records.push(budget_record),
                None => {
                    tracing::debug!(line, "Skipping row missing year, account, state or institution");
                    parsed.skipped_rows += 1;
                }
            }
        }
        Ok(parsed)
    }

    fn build_record(&self, record: &StringRecord, layout: &ColumnLayout) -> Option<BudgetRecord> {
        let year = parse_year(Self::get_field(record, layout.year)?)?;
        let account = Self::get_field(record, layout.account)?.to_string();
        let state = normalize_label(Self::get_field(record, layout.state)?);
        let institution = normalize_label(Self::get_field(record, layout.institution)?);
        let value = Self::get_field(record, layout.value).and_then(brazilian_format::coerce_decimal);
        let population = layout
            .population
            .and_then(|pos| Self::get_field(record, pos))
            .and_then(brazilian_format::coerce_decimal)
            .filter(|p| *p > 0.0)
            .map(|p| p.round() as u64);

        Some(BudgetRecord {
            ledger: self.ledger,
            year,
            state,
            institution,
            account_normalized: normalize_text(&account),
            account,
            value,
            population,
        })
    }

    // Trimmed, non-empty field at `pos`.
    fn get_field(record: &StringRecord, pos: usize) -> Option<&str> {
        record.get(pos).map(str::trim).filter(|field| !field.is_empty())
    }
}

/// Years come as "2023" or, from spreadsheet round-trips, "2023.0".
pub fn parse_year(s: &str) -> Option<i32> {
    let trimmed = s.trim();
    trimmed.parse::<i32>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|y| y.is_finite() && y.fract() == 0.0 && y.abs() < 1e6)
            .map(|y| y as i32)
    })
}
