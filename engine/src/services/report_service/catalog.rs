// Handlers for the selection lists (states, institutions, accounts, municipalities)
use super::helpers::{require_non_empty, selection_from};
use crate::analysis::municipal;
use crate::data::dataset::BudgetDataset;
use crate::error::EngineError;
use crate::services::{
    CatalogResponse, InstitutionRequest, ListInstitutionsRequest, ListMunicipalitiesRequest, ListStatesRequest,
    ReportResponse,
};

fn catalog(items: Vec<String>) -> Result<ReportResponse, EngineError> {
    tracing::debug!(count = items.len(), "Returning catalog");
    Ok(ReportResponse::Catalog(CatalogResponse { items }))
}

pub fn handle_list_states(req: ListStatesRequest, dataset: &BudgetDataset) -> Result<ReportResponse, EngineError> {
    catalog(dataset.table(req.ledger).states())
}

pub fn handle_list_institutions(
    req: ListInstitutionsRequest,
    dataset: &BudgetDataset,
) -> Result<ReportResponse, EngineError> {
    let state = require_non_empty("state", &req.state)?;
    catalog(dataset.table(req.ledger).institutions(state))
}

pub fn handle_list_accounts(req: InstitutionRequest, dataset: &BudgetDataset) -> Result<ReportResponse, EngineError> {
    let selection = selection_from(&req.state, &req.institution)?;
    catalog(dataset.table(req.ledger).accounts(&selection))
}

pub fn handle_list_municipal_states(dataset: &BudgetDataset) -> Result<ReportResponse, EngineError> {
    catalog(municipal::states(&dataset.annual_totals))
}

pub fn handle_list_municipalities(
    req: ListMunicipalitiesRequest,
    dataset: &BudgetDataset,
) -> Result<ReportResponse, EngineError> {
    let state = require_non_empty("state", &req.state)?;
    catalog(municipal::municipalities(&dataset.annual_totals, state))
}
