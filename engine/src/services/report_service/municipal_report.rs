// Handler for the municipal report: yearly totals plus CAPAG ratings
use super::helpers::require_non_empty;
use crate::analysis::municipal;
use crate::data::dataset::BudgetDataset;
use crate::error::EngineError;
use crate::services::{MunicipalReportRequest, MunicipalReportResponse, ReportResponse};

pub fn handle_municipal_report(
    req: MunicipalReportRequest,
    dataset: &BudgetDataset,
) -> Result<ReportResponse, EngineError> {
    let municipality = require_non_empty("municipality", &req.municipality)?;
    let state = req.state.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let totals = municipal::municipality_totals(&dataset.annual_totals, municipality, state);
    let capag = municipal::municipality_capag(&dataset.capag, municipality, &totals);

    let message = if totals.is_empty() {
        tracing::warn!(municipality, state = ?state, "No totals for municipality");
        format!("No data available for {}", municipality)
    } else {
        let first = totals.first().map(|t| t.year).unwrap_or_default();
        let last = totals.last().map(|t| t.year).unwrap_or_default();
        format!("Budget report for {} ({}-{})", municipality, first, last)
    };

    Ok(ReportResponse::MunicipalReport(MunicipalReportResponse {
        municipality: municipality.to_string(),
        state: state.map(str::to_string),
        totals,
        capag,
        message,
    }))
}
