// Handler for the latest-year share ranking of an institution
use super::helpers::selection_from;
use crate::analysis::share_ranking;
use crate::config::EngineSettings;
use crate::data::dataset::BudgetDataset;
use crate::error::EngineError;
use crate::services::{InstitutionRequest, LatestYearSharesResponse, ReportResponse};
use budget_shared::BudgetRecord;

pub fn handle_latest_year_shares(
    req: InstitutionRequest,
    dataset: &BudgetDataset,
    settings: &EngineSettings,
) -> Result<ReportResponse, EngineError> {
    let selection = selection_from(&req.state, &req.institution)?;
    let table = dataset.table(req.ledger);
    let ledger_settings = settings.ledger(req.ledger);
    let reference_account = settings.reference_account(req.ledger);
    let population = table.population(&selection, settings.population_year);

    let mut response = LatestYearSharesResponse {
        ledger: req.ledger,
        state: selection.state.clone(),
        institution: selection.institution.clone(),
        year: None,
        reference_account: ledger_settings.reference_account.clone(),
        reference_found: false,
        reference_value: None,
        population,
        shares: Vec::new(),
        message: String::new(),
    };

    let Some(year) = table.latest_year(&selection) else {
        tracing::warn!(ledger = %req.ledger, state = %selection.state, institution = %selection.institution, "No rows for institution");
        response.message = format!("No data available for {}", selection.institution);
        return Ok(ReportResponse::LatestYearShares(response));
    };
    response.year = Some(year);

    let rows: Vec<&BudgetRecord> = table.select(&selection).filter(|r| r.year == year).collect();
    match share_ranking(&rows, year, &reference_account, ledger_settings.skip_top_shares) {
        Some(ranking) => {
            response.reference_found = true;
            response.reference_value = ranking.reference_value;
            response.message = format!(
                "Share of '{}' ({}) for {}",
                ledger_settings.reference_account, year, selection.institution
            );
            response.shares = ranking.shares;
        }
        None => {
            tracing::warn!(ledger = %req.ledger, year, institution = %selection.institution, "Reference account not found");
            response.message = format!(
                "No data available for '{}' in {}",
                ledger_settings.reference_account, year
            );
        }
    }

    Ok(ReportResponse::LatestYearShares(response))
}
