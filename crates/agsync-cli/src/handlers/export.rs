use crate::args::ScopeArgs;
use crate::presentation::view_models::{RunAction, RunResultViewModel};
use crate::presentation::{ConsoleRenderer, ProgressPrinter};
use agsync_runtime::{AgSync, ExportOptions, OutputLayout, OutputPolicy};
use anyhow::Result;
use std::path::PathBuf;

const DEFAULT_EXPORT_DIR: &str = "agsync-export";

#[allow(clippy::too_many_arguments)]
pub fn handle(
    app: &AgSync,
    scope: &ScopeArgs,
    force: bool,
    jobs: Option<usize>,
    quiet: bool,
    minimal: bool,
    split: Option<usize>,
    flat: bool,
    output: Option<PathBuf>,
    renderer: &ConsoleRenderer,
) -> Result<()> {
    let request = scope.to_request(force)?;

    let out_dir = output
        .or_else(|| app.config().export_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
    let layout = if flat {
        OutputLayout::Flat
    } else {
        OutputLayout::Tree
    };

    let options = ExportOptions {
        policy: OutputPolicy::new(&out_dir, layout),
        minimal,
        split_lines: split,
        force,
        jobs: jobs.unwrap_or_else(|| app.config().jobs()),
    };

    let progress = ProgressPrinter::new(quiet || renderer.is_json());
    let report = app.export(&request, &options, |event| progress.report(event))?;

    tracing::info!(
        processed = report.summary.processed,
        skipped = report.summary.skipped,
        failed = report.summary.failed.len(),
        "export finished"
    );

    let view_model =
        RunResultViewModel::new(RunAction::Export, &report, out_dir.display().to_string());
    renderer.render(&view_model)
}
