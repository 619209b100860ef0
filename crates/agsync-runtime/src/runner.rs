use rayon::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Result;

/// Result of running the action on one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    /// The incrementality check found nothing to do
    Skipped,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub label: String,
    pub reason: String,
}

/// Exact counts for one run; `failed` is in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<FailedItem>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Emitted after each item completes. Ordering across workers is best-effort.
#[derive(Debug)]
pub struct ProgressEvent<'a> {
    /// Items finished so far, including this one
    pub done: usize,
    pub total: usize,
    pub label: &'a str,
    pub outcome: &'a ActionOutcome,
}

/// Runs a per-item action on a bounded worker pool.
///
/// A failing or panicking item never stops the others. With one job the
/// items run in order on the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct ActionRunner {
    jobs: usize,
}

impl Default for ActionRunner {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

impl ActionRunner {
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn run<T, L, A, P>(&self, items: &[T], label: L, action: A, progress: P) -> Result<RunSummary>
    where
        T: Sync,
        L: Fn(&T) -> String + Sync,
        A: Fn(&T) -> ActionOutcome + Sync,
        P: Fn(ProgressEvent<'_>) + Sync,
    {
        let total = items.len();
        let done = AtomicUsize::new(0);

        let run_one = |item: &T| -> (String, ActionOutcome) {
            let label = label(item);
            let outcome = catch_unwind(AssertUnwindSafe(|| action(item))).unwrap_or_else(|panic| {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                ActionOutcome::Failure(format!("panicked: {}", reason))
            });

            if let ActionOutcome::Failure(reason) = &outcome {
                tracing::warn!(item = %label, reason = %reason, "action failed");
            }
            progress(ProgressEvent {
                done: done.fetch_add(1, Ordering::SeqCst) + 1,
                total,
                label: &label,
                outcome: &outcome,
            });
            (label, outcome)
        };

        let outcomes: Vec<(String, ActionOutcome)> = if self.jobs == 1 {
            items.iter().map(run_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()?;
            pool.install(|| items.par_iter().map(run_one).collect())
        };

        let mut summary = RunSummary::default();
        for (label, outcome) in outcomes {
            match outcome {
                ActionOutcome::Success => summary.processed += 1,
                ActionOutcome::Skipped => summary.skipped += 1,
                ActionOutcome::Failure(reason) => summary.failed.push(FailedItem { label, reason }),
            }
        }

        tracing::info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            jobs = self.jobs,
            "run finished"
        );
        Ok(summary)
    }
}
