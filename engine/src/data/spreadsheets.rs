// Loaders for the two pre-aggregated tables (yearly totals and CAPAG ratings).
// Workbooks are read with calamine; anything else is read as a delimited export.
use crate::config::{EngineSettings, InputEncoding};
use crate::data::csv_parser::{encoding, parse_year};
use crate::error::EngineError;
use budget_shared::brazilian_format::DecimalNotation;
use budget_shared::{normalize_label, normalize_text, AnnualTotals, CapagGrade, CapagRecord};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// How delimited exports are split and how numbers stored as text are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOptions {
    pub delimiter: u8,
    pub notation: DecimalNotation,
}

impl SheetOptions {
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, EngineError> {
        Ok(SheetOptions {
            delimiter: settings.spreadsheet_delimiter_byte()?,
            notation: settings.spreadsheet_decimal,
        })
    }
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions { delimiter: b',', notation: DecimalNotation::Plain }
    }
}

// Workbook cells keep their native numbers; exported cells are all text.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::text(s),
            other => Cell::text(&other.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    fn as_number(&self, notation: DecimalNotation) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Cell::Text(s) => notation.parse(s),
        }
    }

    fn as_year(&self) -> Option<i32> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => parse_year(&n.to_string()),
            Cell::Text(s) => parse_year(s),
        }
    }
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    skipped: usize,
}

impl Table {
    fn cell<'a>(row: &'a [Cell], pos: Option<usize>) -> &'a Cell {
        pos.and_then(|p| row.get(p)).unwrap_or(&EMPTY_CELL)
    }
}

// "Nome_Município" and "Nome Municipio" both map to "NOME_MUNICIPIO".
fn canonical_header(header: &str) -> String {
    normalize_text(header).split_whitespace().collect::<Vec<_>>().join("_")
}

struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(headers: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (pos, header) in headers.iter().enumerate() {
            positions.entry(canonical_header(header)).or_insert(pos);
        }
        HeaderIndex { positions }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, EngineError> {
        self.find(name)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing required column '{}'", name)))
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn read_table(path: &Path, options: &SheetOptions) -> Result<Table, EngineError> {
    if !path.exists() {
        return Err(EngineError::MissingFile { path: path.to_path_buf() });
    }
    if is_workbook(path) {
        read_workbook(path)
    } else {
        read_delimited(path, options.delimiter)
    }
}

// First worksheet, first row as header.
fn read_workbook(path: &Path) -> Result<Table, EngineError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::CsvDataFormatError(format!("Workbook '{}' has no worksheet", path.display())))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(Cell::from_data).collect()).collect();

    tracing::debug!(path = %path.display(), rows = rows.len(), "Read workbook");
    Ok(Table { headers, rows, skipped: 0 })
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, EngineError> {
    let content = encoding::decode(&fs::read(path)?, InputEncoding::Utf8)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (idx, result) in rdr.records().enumerate() {
        match result {
            Ok(record) if record.len() <= headers.len() => rows.push(record.iter().map(Cell::text).collect()),
            Ok(record) => {
                tracing::debug!(line = idx + 2, fields = record.len(), "Skipping row with extra fields");
                skipped += 1;
            }
            Err(e) => {
                tracing::debug!(line = idx + 2, error = %e, "Skipping unreadable row");
                skipped += 1;
            }
        }
    }
    Ok(Table { headers, rows, skipped })
}

/// Loads the yearly revenue/expenditure totals per municipality.
pub fn load_annual_totals(path: &Path, options: &SheetOptions) -> Result<Vec<AnnualTotals>, EngineError> {
    let table = read_table(path, options)?;
    let index = HeaderIndex::new(&table.headers);
    let municipality_col = Some(index.require("MUNICIPIO")?);
    let state_col = Some(index.require("UF")?);
    let year_col = Some(index.require("ANO")?);
    let id_col = index.find("ID_MUNICIPIO");
    let notation = options.notation;
    let number = |row: &[Cell], name: &str| Table::cell(row, index.find(name)).as_number(notation);

    let mut skipped = table.skipped;
    let mut totals = Vec::with_capacity(table.rows.len());
    for row in table.rows.iter().map(Vec::as_slice) {
        let (Some(municipality), Some(state), Some(year)) = (
            Table::cell(row, municipality_col).as_text(),
            Table::cell(row, state_col).as_text(),
            Table::cell(row, year_col).as_year(),
        ) else {
            skipped += 1;
            continue;
        };

        totals.push(AnnualTotals {
            municipality_id: Table::cell(row, id_col).as_text().unwrap_or_default(),
            municipality,
            state: normalize_label(state),
            year,
            current_revenue: number(row, "RECEITA_CORRENTE"),
            capital_revenue: number(row, "RECEITA_CAPITAL"),
            intra_budgetary_revenue: number(row, "RECEITA_INTRA_ORCAMENTARIA"),
            total_revenue: number(row, "RECEITA_TOTAL"),
            current_expenditure: number(row, "DESPESA_CORRENTE"),
            capital_expenditure: number(row, "DESPESA_CAPITAL"),
            intra_budgetary_expenditure: number(row, "DESPESA_INTRA_ORCAMENTARIA"),
            total_expenditure: number(row, "DESPESA_TOTAL"),
        });
    }

    tracing::info!(path = %path.display(), rows = totals.len(), skipped, "Loaded annual totals");
    Ok(totals)
}

const CAPAG_KNOWN_COLUMNS: [&str; 10] = [
    "COD",
    "ANO",
    "NOME_MUNICIPIO",
    "INDICADOR_1",
    "INDICADOR_2",
    "INDICADOR_3",
    "NOTA_1",
    "NOTA_2",
    "NOTA_3",
    "CAPAG",
];

/// Loads the CAPAG rating table.
pub fn load_capag(path: &Path, options: &SheetOptions) -> Result<Vec<CapagRecord>, EngineError> {
    let table = read_table(path, options)?;
    let index = HeaderIndex::new(&table.headers);
    let code_col = Some(index.require("COD")?);
    let year_col = Some(index.require("ANO")?);
    let municipality_col = Some(index.require("NOME_MUNICIPIO")?);
    let notation = options.notation;
    let number = |row: &[Cell], name: &str| Table::cell(row, index.find(name)).as_number(notation);
    let grade = |row: &[Cell], name: &str| {
        Table::cell(row, index.find(name))
            .as_text()
            .and_then(|g| g.parse::<CapagGrade>().ok())
    };

    let extra_cols: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !CAPAG_KNOWN_COLUMNS.contains(&canonical_header(h).as_str()))
        .map(|(pos, h)| (pos, h.clone()))
        .collect();

    let mut skipped = table.skipped;
    let mut ratings = Vec::with_capacity(table.rows.len());
    for row in table.rows.iter().map(Vec::as_slice) {
        let (Some(code), Some(year), Some(municipality)) = (
            Table::cell(row, code_col).as_text(),
            Table::cell(row, year_col).as_year(),
            Table::cell(row, municipality_col).as_text(),
        ) else {
            skipped += 1;
            continue;
        };

        ratings.push(CapagRecord {
            code,
            municipality,
            year,
            debt_indicator: number(row, "INDICADOR_1"),
            savings_indicator: number(row, "INDICADOR_2"),
            liquidity_indicator: number(row, "INDICADOR_3"),
            partial_grades: [grade(row, "NOTA_1"), grade(row, "NOTA_2"), grade(row, "NOTA_3")],
            official_grade: grade(row, "CAPAG"),
            extra: extra_cols
                .iter()
                .map(|(pos, name)| (name.clone(), Table::cell(row, Some(*pos)).as_text().unwrap_or_default()))
                .collect(),
        });
    }

    tracing::info!(path = %path.display(), rows = ratings.len(), skipped, "Loaded CAPAG ratings");
    Ok(ratings)
}
