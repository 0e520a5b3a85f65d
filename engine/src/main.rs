// Engine main entry point: loads the inputs once, then answers one JSON
// request per stdin line with one JSON response per stdout line.
use budget_engine::{BudgetReportService, EngineSettings};
use std::io;
use std::path::PathBuf;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the responses.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    info!("Starting Municipal Budget Engine...");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = EngineSettings::load(config_path.as_deref())?;
    info!(
        revenue_dir = %settings.revenue.input_dir.display(),
        expenditure_dir = %settings.expenditure.input_dir.display(),
        "Loading budget inputs"
    );

    let service = BudgetReportService::load(settings)?;
    info!(
        revenue_rows = service.dataset().revenue.len(),
        expenditure_rows = service.dataset().expenditure.len(),
        municipalities = service.dataset().annual_totals.len(),
        "Ready for requests"
    );

    let answered = service.serve(io::stdin().lock(), io::stdout().lock())?;

    info!(answered, "Input closed, shutting down");
    Ok(())
}
