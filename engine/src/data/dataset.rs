// Everything one session reads from disk, loaded up front
use crate::config::EngineSettings;
use crate::data::budget_store::BudgetTable;
use crate::data::csv_parser::BudgetCsvParser;
use crate::data::spreadsheets::{self, SheetOptions};
use crate::error::EngineError;
use budget_shared::{AnnualTotals, CapagRecord, Ledger};
use chrono::{DateTime, Utc};

pub struct BudgetDataset {
    pub revenue: BudgetTable,
    pub expenditure: BudgetTable,
    pub annual_totals: Vec<AnnualTotals>,
    pub capag: Vec<CapagRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl BudgetDataset {
    /// Reads both extract directories and both spreadsheet exports.
    /// Any absent input is fatal; bad rows inside them are not.
    pub fn load(settings: &EngineSettings) -> Result<Self, EngineError> {
        let revenue = Self::load_table(Ledger::Revenue, settings)?;
        let expenditure = Self::load_table(Ledger::Expenditure, settings)?;
        let options = SheetOptions::from_settings(settings)?;
        let annual_totals = spreadsheets::load_annual_totals(&settings.annual_totals_path, &options)?;
        let capag = spreadsheets::load_capag(&settings.capag_path, &options)?;

        Ok(Self::from_parts(revenue, expenditure, annual_totals, capag))
    }

    pub fn from_parts(
        revenue: BudgetTable,
        expenditure: BudgetTable,
        annual_totals: Vec<AnnualTotals>,
        capag: Vec<CapagRecord>,
    ) -> Self {
        BudgetDataset {
            revenue,
            expenditure,
            annual_totals,
            capag,
            loaded_at: Utc::now(),
        }
    }

    pub fn table(&self, ledger: Ledger) -> &BudgetTable {
        match ledger {
            Ledger::Revenue => &self.revenue,
            Ledger::Expenditure => &self.expenditure,
        }
    }

    fn load_table(ledger: Ledger, settings: &EngineSettings) -> Result<BudgetTable, EngineError> {
        let parser = BudgetCsvParser::from_settings(ledger, settings)?;
        let records = parser.load_records_from_dir(&settings.ledger(ledger).input_dir)?;
        Ok(BudgetTable::from_records(ledger, records))
    }
}
