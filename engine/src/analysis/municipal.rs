// Queries over the pre-aggregated yearly totals and the CAPAG table
use crate::capag::{self, CapagAssessment};
use budget_shared::{normalize_label, normalize_text, AnnualTotals, CapagGrade, CapagRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Sorted unique states of the totals table.
pub fn states(totals: &[AnnualTotals]) -> Vec<String> {
    totals
        .iter()
        .map(|t| t.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted unique municipality names of a state.
pub fn municipalities(totals: &[AnnualTotals], state: &str) -> Vec<String> {
    let state = normalize_label(state);
    totals
        .iter()
        .filter(|t| t.state == state)
        .map(|t| t.municipality.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Totals rows of a municipality, by year. Names are compared normalized.
pub fn municipality_totals(totals: &[AnnualTotals], municipality: &str, state: Option<&str>) -> Vec<AnnualTotals> {
    let wanted = normalize_text(municipality);
    let state = state.map(normalize_label);
    let mut rows: Vec<AnnualTotals> = totals
        .iter()
        .filter(|t| normalize_text(&t.municipality) == wanted)
        .filter(|t| state.as_ref().map_or(true, |s| &t.state == s))
        .cloned()
        .collect();
    rows.sort_by_key(|t| t.year);
    rows
}

/// A CAPAG row as shown in the report: without the code column, with the grades
/// recomputed from the indicators when all three are present.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CapagRow {
    pub year: i32,
    pub municipality: String,
    pub debt_indicator: Option<f64>,
    pub savings_indicator: Option<f64>,
    pub liquidity_indicator: Option<f64>,
    pub partial_grades: [Option<CapagGrade>; 3],
    pub official_grade: Option<CapagGrade>,
    pub assessment: Option<CapagAssessment>,
    pub extra: Vec<(String, String)>,
}

impl From<&CapagRecord> for CapagRow {
    fn from(record: &CapagRecord) -> Self {
        CapagRow {
            year: record.year,
            municipality: record.municipality.clone(),
            debt_indicator: record.debt_indicator,
            savings_indicator: record.savings_indicator,
            liquidity_indicator: record.liquidity_indicator,
            partial_grades: record.partial_grades,
            official_grade: record.official_grade,
            assessment: capag::assess_record(record),
            extra: record.extra.clone(),
        }
    }
}

/// CAPAG rows of a municipality, by year.
///
/// Rows are matched on the municipality codes found in `totals_rows` when any
/// CAPAG row carries one of them; otherwise on the normalized name, which is
/// ambiguous across states.
pub fn municipality_capag(capag: &[CapagRecord], municipality: &str, totals_rows: &[AnnualTotals]) -> Vec<CapagRow> {
    let codes: HashSet<&str> = totals_rows
        .iter()
        .map(|t| t.municipality_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();

    let by_code: Vec<&CapagRecord> = capag.iter().filter(|c| codes.contains(c.code.as_str())).collect();
    let mut matched = if by_code.is_empty() {
        let wanted = normalize_text(municipality);
        capag
            .iter()
            .filter(|c| normalize_text(&c.municipality) == wanted)
            .collect()
    } else {
        by_code
    };

    matched.sort_by_key(|c| c.year);
    matched.into_iter().map(CapagRow::from).collect()
}
