use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the budget a table belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Ledger {
    Revenue,
    Expenditure,
}

impl Ledger {
    pub fn name(&self) -> &'static str {
        match self {
            Ledger::Revenue => "revenue",
            Ledger::Expenditure => "expenditure",
        }
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a revenue or expenditure extract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetRecord {
    pub ledger: Ledger,
    pub year: i32,
    /// State abbreviation (UF), trimmed and uppercased.
    pub state: String,
    /// Institution name, trimmed and uppercased.
    pub institution: String,
    /// Account name as it appears in the source file.
    pub account: String,
    /// Account name after `normalize_text`, used for matching.
    pub account_normalized: String,
    /// `None` when the source value could not be coerced.
    pub value: Option<f64>,
    pub population: Option<u64>,
}

/// Pre-aggregated yearly totals of one municipality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnualTotals {
    pub municipality_id: String,
    pub municipality: String,
    pub state: String,
    pub year: i32,
    pub current_revenue: Option<f64>,
    pub capital_revenue: Option<f64>,
    pub intra_budgetary_revenue: Option<f64>,
    pub total_revenue: Option<f64>,
    pub current_expenditure: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub intra_budgetary_expenditure: Option<f64>,
    pub total_expenditure: Option<f64>,
}

/// Payment-capacity rating band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapagGrade {
    A,
    B,
    C,
}

impl fmt::Display for CapagGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapagGrade::A => write!(f, "A"),
            CapagGrade::B => write!(f, "B"),
            CapagGrade::C => write!(f, "C"),
        }
    }
}

impl FromStr for CapagGrade {
    type Err = anyhow::Error;

    // Official ratings also come as "A+", "B-" or "n.d."; only the letter is kept.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('A') => Ok(CapagGrade::A),
            Some('B') => Ok(CapagGrade::B),
            Some('C') => Ok(CapagGrade::C),
            _ => Err(anyhow::anyhow!("Unknown CAPAG grade '{}'", s)),
        }
    }
}

/// One row of the CAPAG table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapagRecord {
    pub code: String,
    pub municipality: String,
    pub year: i32,
    /// Indicador 1: debt over net current revenue, in percent.
    pub debt_indicator: Option<f64>,
    /// Indicador 2: current savings, in percent.
    pub savings_indicator: Option<f64>,
    /// Indicador 3: liquidity, in percent.
    pub liquidity_indicator: Option<f64>,
    pub partial_grades: [Option<CapagGrade>; 3],
    pub official_grade: Option<CapagGrade>,
    /// Remaining columns, in file order, kept for display.
    pub extra: Vec<(String, String)>,
}
