// Percentages of a line item against the reference line item of the same year
use budget_shared::brazilian_format::format_decimal;
use budget_shared::BudgetRecord;
use serde::Serialize;
use std::cmp::Ordering;

/// `value / reference * 100`; missing when either side is missing or the reference is zero.
pub fn percent_of(value: Option<f64>, reference: Option<f64>) -> Option<f64> {
    match (value, reference) {
        (Some(v), Some(r)) if r != 0.0 => Some((v / r) * 100.0).filter(|p| p.is_finite()),
        _ => None,
    }
}

/// First row of `year` whose normalized account is the reference account.
pub fn reference_row<'a>(rows: &[&'a BudgetRecord], year: i32, reference_account: &str) -> Option<&'a BudgetRecord> {
    rows.iter()
        .copied()
        .find(|r| r.year == year && r.account_normalized == reference_account)
}

/// Percentage of one row against the reference row of its year in `rows`.
pub fn derive_percentage(target: &BudgetRecord, rows: &[&BudgetRecord], reference_account: &str) -> Option<f64> {
    let reference = reference_row(rows, target.year, reference_account)?;
    percent_of(target.value, reference.value)
}

/// One entry per row: the percentage for rows of `selected_account`, missing for the rest.
pub fn derive_percentages(rows: &[&BudgetRecord], selected_account: &str, reference_account: &str) -> Vec<Option<f64>> {
    rows.iter()
        .map(|row| {
            if row.account_normalized == selected_account {
                derive_percentage(row, rows, reference_account)
            } else {
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvolutionPoint {
    pub year: i32,
    pub account: String,
    pub value: Option<f64>,
    pub reference_value: Option<f64>,
    pub percentage: Option<f64>,
}

/// Yearly values of the selected account next to the reference value of the same year.
pub fn account_evolution(rows: &[&BudgetRecord], selected_account: &str, reference_account: &str) -> Vec<EvolutionPoint> {
    let mut points: Vec<EvolutionPoint> = rows
        .iter()
        .filter(|row| row.account_normalized == selected_account)
        .map(|row| EvolutionPoint {
            year: row.year,
            account: row.account.clone(),
            value: row.value,
            reference_value: reference_row(rows, row.year, reference_account).and_then(|r| r.value),
            percentage: derive_percentage(row, rows, reference_account),
        })
        .collect();
    points.sort_by_key(|p| p.year);
    points
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountShare {
    pub account: String,
    pub value: Option<f64>,
    pub percentage: Option<f64>,
    /// Percentage as shown on the dashboard, e.g. "40,00%".
    pub label: Option<String>,
}

/// Two decimals, comma separator, percent sign.
pub fn percent_label(percentage: f64) -> String {
    format!("{}%", format_decimal(percentage, 2))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareRanking {
    pub year: i32,
    pub reference_value: Option<f64>,
    pub shares: Vec<AccountShare>,
}

/// Ranks the rows of one year by their share of the reference value, largest first,
/// then drops the first `skip` entries (the aggregate lines at the top).
///
/// `None` when the year has no reference row.
pub fn share_ranking(rows: &[&BudgetRecord], year: i32, reference_account: &str, skip: usize) -> Option<ShareRanking> {
    let year_rows: Vec<&BudgetRecord> = rows.iter().copied().filter(|r| r.year == year).collect();
    let reference_value = reference_row(&year_rows, year, reference_account)?.value;

    let mut shares: Vec<AccountShare> = year_rows
        .iter()
        .map(|row| {
            let percentage = percent_of(row.value, reference_value);
            AccountShare {
                account: row.account.clone(),
                value: row.value,
                percentage,
                label: percentage.map(percent_label),
            }
        })
        .collect();
    shares.sort_by(|a, b| descending_missing_last(a.percentage, b.percentage));

    Some(ShareRanking {
        year,
        reference_value,
        shares: shares.into_iter().skip(skip).collect(),
    })
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
