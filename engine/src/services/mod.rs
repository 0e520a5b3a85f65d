// Request and response messages of the report service.
// Each dashboard interaction maps to one request; every response is serializable.
use crate::analysis::municipal::CapagRow;
use crate::analysis::{AccountShare, EvolutionPoint};
use crate::config::YearRange;
use budget_shared::{AnnualTotals, Ledger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod report_service;

pub use report_service::BudgetReportService;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListStatesRequest {
    pub ledger: Ledger,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListInstitutionsRequest {
    pub ledger: Ledger,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InstitutionRequest {
    pub ledger: Ledger,
    pub state: String,
    pub institution: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AccountEvolutionRequest {
    pub ledger: Ledger,
    pub state: String,
    pub institution: String,
    /// Raw or normalized account name; matched after normalization.
    pub account: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListMunicipalitiesRequest {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MunicipalReportRequest {
    pub municipality: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportRequest {
    ListStates(ListStatesRequest),
    ListInstitutions(ListInstitutionsRequest),
    ListAccounts(InstitutionRequest),
    LatestYearShares(InstitutionRequest),
    AccountEvolution(AccountEvolutionRequest),
    ListMunicipalStates,
    ListMunicipalities(ListMunicipalitiesRequest),
    MunicipalReport(MunicipalReportRequest),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogResponse {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestYearSharesResponse {
    pub ledger: Ledger,
    pub state: String,
    pub institution: String,
    /// Latest year with data for the institution, if any.
    pub year: Option<i32>,
    pub reference_account: String,
    pub reference_found: bool,
    pub reference_value: Option<f64>,
    pub population: Option<u64>,
    pub shares: Vec<AccountShare>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountEvolutionResponse {
    pub ledger: Ledger,
    pub state: String,
    pub institution: String,
    pub account: String,
    pub reference_account: String,
    pub year_range: YearRange,
    pub points: Vec<EvolutionPoint>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MunicipalReportResponse {
    pub municipality: String,
    pub state: Option<String>,
    pub totals: Vec<AnnualTotals>,
    pub capag: Vec<CapagRow>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportResponse {
    Catalog(CatalogResponse),
    LatestYearShares(LatestYearSharesResponse),
    AccountEvolution(AccountEvolutionResponse),
    MunicipalReport(MunicipalReportResponse),
    Error(ErrorResponse),
}

/// What the binary writes per request line.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub data_loaded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub response: ReportResponse,
}
