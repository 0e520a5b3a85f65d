// In-memory table of one ledger's extract rows, with the filters the reports need
use budget_shared::{normalize_label, BudgetRecord, Ledger};
use std::collections::BTreeSet;

/// A (state, institution) pair, compared on trimmed uppercase labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub state: String,
    pub institution: String,
}

impl Selection {
    pub fn new(state: &str, institution: &str) -> Self {
        Selection {
            state: normalize_label(state),
            institution: normalize_label(institution),
        }
    }

    pub fn matches(&self, record: &BudgetRecord) -> bool {
        record.state == self.state && record.institution == self.institution
    }
}

pub struct BudgetTable {
    ledger: Ledger,
    records: Vec<BudgetRecord>,
}

impl BudgetTable {
    pub fn new(ledger: Ledger) -> Self {
        BudgetTable { ledger, records: Vec::new() }
    }

    pub fn from_records(ledger: Ledger, records: Vec<BudgetRecord>) -> Self {
        let mut table = Self::new(ledger);
        table.add_records(records);
        table
    }

    pub fn ledger(&self) -> Ledger {
        self.ledger
    }

    /// Appends rows; rows of the other ledger are dropped.
    pub fn add_records(&mut self, new_records: Vec<BudgetRecord>) {
        let offered = new_records.len();
        let before = self.records.len();
        let ledger = self.ledger;
        self.records.extend(new_records.into_iter().filter(|r| r.ledger == ledger));
        let dropped = offered - (self.records.len() - before);
        if dropped > 0 {
            tracing::warn!(ledger = %ledger, dropped, "Dropped records belonging to another ledger");
        }
    }

    pub fn records(&self) -> &[BudgetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique states.
    pub fn states(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.state.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique institutions of a state.
    pub fn institutions(&self, state: &str) -> Vec<String> {
        let state = normalize_label(state);
        self.records
            .iter()
            .filter(|r| r.state == state)
            .map(|r| r.institution.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique raw account names of a selection.
    pub fn accounts(&self, selection: &Selection) -> Vec<String> {
        self.select(selection)
            .map(|r| r.account.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows of a selection, in load order.
    pub fn select(&self, selection: &Selection) -> impl Iterator<Item = &BudgetRecord> + '_ {
        let selection = selection.clone();
        self.records.iter().filter(move |r| selection.matches(r))
    }

    /// Rows of a selection whose year falls in `[from, to]`.
    pub fn select_years(&self, selection: &Selection, from: i32, to: i32) -> Vec<&BudgetRecord> {
        self.select(selection).filter(|r| r.year >= from && r.year <= to).collect()
    }

    pub fn latest_year(&self, selection: &Selection) -> Option<i32> {
        self.select(selection).map(|r| r.year).max()
    }

    /// Population reported for the selection in `year`, from the first row carrying one.
    pub fn population(&self, selection: &Selection, year: i32) -> Option<u64> {
        self.select(selection)
            .filter(|r| r.year == year)
            .find_map(|r| r.population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_shared::normalize_text;

    fn record(state: &str, institution: &str, account: &str, year: i32, value: Option<f64>) -> BudgetRecord {
        BudgetRecord {
            ledger: Ledger::Revenue,
            year,
            state: state.to_string(),
            institution: institution.to_string(),
            account: account.to_string(),
            account_normalized: normalize_text(account),
            value,
            population: None,
        }
    }

    fn sample_table() -> BudgetTable {
        BudgetTable::from_records(
            Ledger::Revenue,
            vec![
                record("SP", "PREFEITURA B", "Impostos", 2022, Some(1.0)),
                record("SP", "PREFEITURA A", "Taxas", 2023, Some(2.0)),
                record("SP", "PREFEITURA A", "Impostos", 2021, None),
                record("MG", "PREFEITURA C", "Impostos", 2023, Some(3.0)),
            ],
        )
    }

    #[test]
    fn test_catalogs_are_sorted_and_unique() {
        let table = sample_table();
        assert_eq!(table.states(), vec!["MG", "SP"]);
        assert_eq!(table.institutions(" sp "), vec!["PREFEITURA A", "PREFEITURA B"]);
        assert_eq!(table.accounts(&Selection::new("sp", "Prefeitura A")), vec!["Impostos", "Taxas"]);
        assert!(table.institutions("RJ").is_empty());
    }

    #[test]
    fn test_latest_year_and_range() {
        let table = sample_table();
        let selection = Selection::new("SP", "PREFEITURA A");
        assert_eq!(table.latest_year(&selection), Some(2023));
        assert_eq!(table.select_years(&selection, 2022, 2023).len(), 1);
        assert_eq!(table.latest_year(&Selection::new("RJ", "X")), None);
    }

    #[test]
    fn test_population_first_present() {
        let mut with_population = record("SP", "PREFEITURA A", "Taxas", 2023, Some(2.0));
        with_population.population = Some(1000);
        let mut table = sample_table();
        table.add_records(vec![with_population]);
        let selection = Selection::new("SP", "PREFEITURA A");
        assert_eq!(table.population(&selection, 2023), Some(1000));
        assert_eq!(table.population(&selection, 2021), None);
    }

    #[test]
    fn test_other_ledger_rows_are_dropped() {
        let mut expenditure = record("SP", "PREFEITURA A", "Pessoal", 2023, Some(1.0));
        expenditure.ledger = Ledger::Expenditure;
        let mut table = BudgetTable::new(Ledger::Revenue);
        table.add_records(vec![expenditure]);
        assert!(table.is_empty());
    }
}
