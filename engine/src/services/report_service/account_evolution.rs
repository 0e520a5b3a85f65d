// Handler for the yearly evolution of one account against the reference account
use super::helpers::{require_non_empty, selection_from};
use crate::analysis::account_evolution;
use crate::config::EngineSettings;
use crate::data::dataset::BudgetDataset;
use crate::error::EngineError;
use crate::services::{AccountEvolutionRequest, AccountEvolutionResponse, ReportResponse};
use budget_shared::normalize_text;

pub fn handle_account_evolution(
    req: AccountEvolutionRequest,
    dataset: &BudgetDataset,
    settings: &EngineSettings,
) -> Result<ReportResponse, EngineError> {
    let selection = selection_from(&req.state, &req.institution)?;
    let account = normalize_text(require_non_empty("account", &req.account)?);
    if account.is_empty() {
        return Err(EngineError::ProcessingError(format!(
            "Account '{}' is empty after normalization",
            req.account
        )));
    }

    let range = settings.year_range;
    let reference_account = settings.reference_account(req.ledger);
    let rows = dataset.table(req.ledger).select_years(&selection, range.start, range.end);
    let points = account_evolution(&rows, &account, &reference_account);

    let message = if points.is_empty() {
        tracing::warn!(ledger = %req.ledger, account = %req.account, "No rows for account in year range");
        format!("No data available for '{}' between {} and {}", req.account, range.start, range.end)
    } else if points.iter().all(|p| p.percentage.is_none()) {
        "No data available to compute the percentage".to_string()
    } else {
        format!(
            "'{}' over '{}' ({}-{})",
            req.account,
            settings.ledger(req.ledger).reference_account,
            range.start,
            range.end
        )
    };

    Ok(ReportResponse::AccountEvolution(AccountEvolutionResponse {
        ledger: req.ledger,
        state: selection.state,
        institution: selection.institution,
        account: req.account,
        reference_account: settings.ledger(req.ledger).reference_account.clone(),
        year_range: range,
        points,
        message,
    }))
}
