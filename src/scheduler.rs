//! Recurring processing scheduler
//!
//! Runs the enrichment + synthesis cycle, sleeps, repeats, for the life of
//! the process; there is no stop operation. Overlap protection lives in the
//! processor's single-flight flag rather than here, so manual "analyze now"
//! triggers share the exact same guarantee as the timer.

use crate::pipeline::{CycleOutcome, Processor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed-interval driver for the processing cycle
pub struct ProcessingScheduler {
    processor: Arc<Processor>,
    started: AtomicBool,
}

impl ProcessingScheduler {
    pub fn new(processor: Arc<Processor>) -> Self {
        Self {
            processor,
            started: AtomicBool::new(false),
        }
    }

    /// Begin the repeating cycle: run, wait `interval`, repeat.
    ///
    /// Idempotent: calling `start` while a loop is already active is a
    /// no-op. The spawned loop never exits on its own.
    pub fn start(&self, interval: Duration) {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Scheduler already started, ignoring");
            return;
        }

        let processor = self.processor.clone();
        tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Processing scheduler started");
            loop {
                match processor.run_cycle().await {
                    CycleOutcome::AlreadyRunning => {
                        tracing::info!("Skipped scheduled cycle, a run is already in flight");
                    }
                    CycleOutcome::Disabled => {
                        tracing::debug!("Skipped scheduled cycle, AI features disabled");
                    }
                    // Completion and failure are logged by the processor.
                    CycleOutcome::Completed(_) | CycleOutcome::Failed => {}
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    /// Whether the loop has been started.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}
