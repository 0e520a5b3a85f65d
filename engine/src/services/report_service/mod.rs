// Report service: owns the loaded dataset and dispatches requests to the
// per-operation handlers in the sibling modules.
use super::{ErrorResponse, ReportRequest, ReportResponse, ResponseEnvelope};
use crate::config::EngineSettings;
use crate::data::dataset::BudgetDataset;
use crate::error::EngineError;
use std::io::{self, BufRead, Write};

pub mod account_evolution;
pub mod catalog;
pub mod helpers;
pub mod latest_year_shares;
pub mod municipal_report;

pub struct BudgetReportService {
    dataset: BudgetDataset,
    settings: EngineSettings,
}

impl BudgetReportService {
    pub fn new(dataset: BudgetDataset, settings: EngineSettings) -> Self {
        BudgetReportService { dataset, settings }
    }

    /// Loads every input named by `settings` and wraps it in a service.
    pub fn load(settings: EngineSettings) -> Result<Self, EngineError> {
        let dataset = BudgetDataset::load(&settings)?;
        Ok(Self::new(dataset, settings))
    }

    pub fn dataset(&self) -> &BudgetDataset {
        &self.dataset
    }

    pub fn handle(&self, request: ReportRequest) -> Result<ReportResponse, EngineError> {
        match request {
            ReportRequest::ListStates(req) => {
                tracing::info!(ledger = %req.ledger, "Received ListStatesRequest");
                catalog::handle_list_states(req, &self.dataset)
            }
            ReportRequest::ListInstitutions(req) => {
                tracing::info!(ledger = %req.ledger, state = %req.state, "Received ListInstitutionsRequest");
                catalog::handle_list_institutions(req, &self.dataset)
            }
            ReportRequest::ListAccounts(req) => {
                tracing::info!(
                    ledger = %req.ledger,
                    state = %req.state,
                    institution = %req.institution,
                    "Received ListAccountsRequest"
                );
                catalog::handle_list_accounts(req, &self.dataset)
            }
            ReportRequest::LatestYearShares(req) => {
                tracing::info!(
                    ledger = %req.ledger,
                    state = %req.state,
                    institution = %req.institution,
                    "Received LatestYearSharesRequest"
                );
                latest_year_shares::handle_latest_year_shares(req, &self.dataset, &self.settings)
            }
            ReportRequest::AccountEvolution(req) => {
                tracing::info!(
                    ledger = %req.ledger,
                    state = %req.state,
                    institution = %req.institution,
                    account = %req.account,
                    "Received AccountEvolutionRequest"
                );
                account_evolution::handle_account_evolution(req, &self.dataset, &self.settings)
            }
            ReportRequest::ListMunicipalStates => {
                tracing::info!("Received ListMunicipalStatesRequest");
                catalog::handle_list_municipal_states(&self.dataset)
            }
            ReportRequest::ListMunicipalities(req) => {
                tracing::info!(state = %req.state, "Received ListMunicipalitiesRequest");
                catalog::handle_list_municipalities(req, &self.dataset)
            }
            ReportRequest::MunicipalReport(req) => {
                tracing::info!(
                    municipality = %req.municipality,
                    state = ?req.state,
                    "Received MunicipalReportRequest"
                );
                municipal_report::handle_municipal_report(req, &self.dataset)
            }
        }
    }

    /// One JSON request line in, one envelope out. Failures become error responses.
    pub fn handle_line(&self, line: &str) -> ResponseEnvelope {
        let response = serde_json::from_str::<ReportRequest>(line)
            .map_err(EngineError::from)
            .and_then(|request| self.handle(request))
            .unwrap_or_else(Self::error_response);
        self.envelope(response)
    }

    /// Answers every request line of `input` on `output` until end of input.
    /// Blank lines are ignored; a line that is not UTF-8 gets an error response.
    pub fn serve<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<usize> {
        let mut buf = Vec::new();
        let mut answered = 0;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let envelope = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line),
                Err(e) => self.envelope(Self::error_response(e.into())),
            };
            serde_json::to_writer(&mut output, &envelope)?;
            output.write_all(b"\n")?;
            output.flush()?;
            answered += 1;
        }
        Ok(answered)
    }

    fn error_response(err: EngineError) -> ReportResponse {
        tracing::error!(error = %err, "Request failed");
        ReportResponse::Error(ErrorResponse {
            kind: err.kind().to_string(),
            message: err.to_string(),
        })
    }

    fn envelope(&self, response: ReportResponse) -> ResponseEnvelope {
        ResponseEnvelope {
            data_loaded_at: self.dataset.loaded_at,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::budget_store::BudgetTable;
    use crate::services::{AccountEvolutionRequest, InstitutionRequest, ListStatesRequest};
    use budget_shared::{normalize_text, BudgetRecord, Ledger};

    fn record(ledger: Ledger, account: &str, year: i32, value: Option<f64>) -> BudgetRecord {
        BudgetRecord {
            ledger,
            year,
            state: "SP".to_string(),
            institution: "PREFEITURA A".to_string(),
            account: account.to_string(),
            account_normalized: normalize_text(account),
            value,
            population: None,
        }
    }

    fn create_test_service() -> BudgetReportService {
        let rcl = "RECEITA CORRENTE LÍQUIDA (III) = (I - II)";
        let revenue = BudgetTable::from_records(
            Ledger::Revenue,
            vec![
                record(Ledger::Revenue, rcl, 2022, Some(1000.0)),
                record(Ledger::Revenue, "Impostos", 2022, Some(250.0)),
                record(Ledger::Revenue, rcl, 2023, Some(2000.0)),
                record(Ledger::Revenue, "Impostos", 2023, Some(500.0)),
            ],
        );
        let expenditure = BudgetTable::from_records(
            Ledger::Expenditure,
            vec![record(Ledger::Expenditure, "Pessoal", 2023, Some(10.0))],
        );
        let dataset = BudgetDataset::from_parts(revenue, expenditure, Vec::new(), Vec::new());
        BudgetReportService::new(dataset, EngineSettings::default())
    }

    #[test]
    fn test_handle_list_states() {
        let service = create_test_service();
        let response = service
            .handle(ReportRequest::ListStates(ListStatesRequest { ledger: Ledger::Revenue }))
            .unwrap();
        assert_eq!(
            response,
            ReportResponse::Catalog(crate::services::CatalogResponse { items: vec!["SP".to_string()] })
        );
    }

    #[test]
    fn test_handle_account_evolution() {
        let service = create_test_service();
        let response = service
            .handle(ReportRequest::AccountEvolution(AccountEvolutionRequest {
                ledger: Ledger::Revenue,
                state: "sp".to_string(),
                institution: "Prefeitura A".to_string(),
                account: "impostos".to_string(),
            }))
            .unwrap();
        let evolution = match response {
            ReportResponse::AccountEvolution(evolution) => evolution,
            other => panic!("unexpected response: {:?}", other),
        };
        assert_eq!(evolution.points.len(), 2);
        assert_eq!(evolution.points[0].percentage, Some(25.0));
        assert_eq!(evolution.points[1].percentage, Some(25.0));
    }

    #[test]
    fn test_handle_rejects_empty_institution() {
        let service = create_test_service();
        let err = service
            .handle(ReportRequest::LatestYearShares(InstitutionRequest {
                ledger: Ledger::Revenue,
                state: "SP".to_string(),
                institution: "  ".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::ProcessingError(_)));
    }

    #[test]
    fn test_handle_line_success() {
        let service = create_test_service();
        let envelope = service.handle_line(r#"{"type":"list_institutions","ledger":"revenue","state":"SP"}"#);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "catalog");
        assert_eq!(json["items"][0], "PREFEITURA A");
        assert!(json["data_loaded_at"].is_string());
    }

    #[test]
    fn test_handle_line_bad_json() {
        let service = create_test_service();
        let envelope = service.handle_line("{not json");
        match envelope.response {
            ReportResponse::Error(err) => assert_eq!(err.kind, "json"),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_handle_line_unknown_request_type() {
        let service = create_test_service();
        let envelope = service.handle_line(r#"{"type":"unknown_report"}"#);
        assert!(matches!(envelope.response, ReportResponse::Error(_)));
    }

    #[test]
    fn test_serve_keeps_going_after_bad_lines() {
        let service = create_test_service();
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"type\":\"list_states\",\"ledger\":\"revenue\"}\n");
        input.extend_from_slice(b"{\"type\":\"list_states\",\"ledger\":\"S\xe3o\"}\n");
        input.extend_from_slice(b"\n");
        input.extend_from_slice(b"{\"type\":\"list_states\",\"ledger\":\"expenditure\"}");

        let mut output = Vec::new();
        let answered = service.serve(std::io::Cursor::new(input), &mut output).unwrap();
        assert_eq!(answered, 3);

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "catalog");
        assert_eq!(lines[0]["items"][0], "SP");
        assert_eq!(lines[1]["type"], "error");
        assert_eq!(lines[1]["kind"], "request_encoding");
        assert_eq!(lines[2]["type"], "catalog");
        assert_eq!(lines[2]["items"][0], "SP");
    }
}
