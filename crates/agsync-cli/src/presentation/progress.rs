use agsync_runtime::{ActionOutcome, ProgressEvent};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Per-session progress lines on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ProgressPrinter {
    enabled: bool,
    color: bool,
}

impl ProgressPrinter {
    pub fn new(quiet: bool) -> Self {
        let stderr = std::io::stderr();
        Self {
            enabled: !quiet,
            color: stderr.is_terminal(),
        }
    }

    pub fn report(&self, event: ProgressEvent<'_>) {
        if !self.enabled {
            return;
        }

        let width = event.total.to_string().len();
        let counter = format!("[{:>width$}/{}]", event.done, event.total, width = width);
        let status = match (event.outcome, self.color) {
            (ActionOutcome::Success, true) => "ok".green().to_string(),
            (ActionOutcome::Skipped, true) => "unchanged".dimmed().to_string(),
            (ActionOutcome::Failure(_), true) => "failed".red().to_string(),
            (ActionOutcome::Success, false) => "ok".to_string(),
            (ActionOutcome::Skipped, false) => "unchanged".to_string(),
            (ActionOutcome::Failure(_), false) => "failed".to_string(),
        };
        eprintln!("{} {} {}", counter, status, event.label);
    }
}
