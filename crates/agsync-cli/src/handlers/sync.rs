use crate::args::ScopeArgs;
use crate::presentation::view_models::{RunAction, RunResultViewModel};
use crate::presentation::{ConsoleRenderer, ProgressPrinter};
use agsync_runtime::{AgSync, SyncOptions};
use anyhow::Result;

pub fn handle(
    app: &AgSync,
    scope: &ScopeArgs,
    force: bool,
    jobs: Option<usize>,
    quiet: bool,
    renderer: &ConsoleRenderer,
) -> Result<()> {
    let request = scope.to_request(force)?;
    let options = SyncOptions {
        force,
        jobs: jobs.unwrap_or_else(|| app.config().jobs()),
    };

    let progress = ProgressPrinter::new(quiet || renderer.is_json());
    let report = app.sync(&request, &options, |event| progress.report(event))?;

    tracing::info!(
        processed = report.summary.processed,
        skipped = report.summary.skipped,
        failed = report.summary.failed.len(),
        "sync finished"
    );

    let destination = app.layout().metrics_db().display().to_string();
    renderer.render(&RunResultViewModel::new(RunAction::Sync, &report, destination))
}
