//! Processing cycle orchestration
//!
//! One cycle = enrichment over the full note list, then synthesis over the
//! recent window, then stamping `last_processed`. Both the interval timer
//! and the manual "analyze now" path enter through
//! [`Processor::run_cycle`], which admits at most one cycle at a time: a
//! request arriving while a cycle is in flight is dropped, not queued.

pub mod enrich;
pub mod synthesize;

#[cfg(test)]
pub(crate) mod testing;

pub use enrich::{EnrichmentPipeline, EnrichmentReport};
pub use synthesize::InsightSynthesizer;

use crate::gateway::LanguageModel;
use crate::memory::MemoryStore;
use crate::notes::NoteRepository;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a [`Processor::run_cycle`] invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion and memory was persisted
    Completed(EnrichmentReport),

    /// A cycle was already in flight; this invocation did nothing
    AlreadyRunning,

    /// No API credential is configured; AI features are disabled
    Disabled,

    /// The cycle ran but hit an unrecoverable step; memory was left as-is
    /// and `last_processed` was not stamped
    Failed,
}

/// Orchestrates the full enrichment + synthesis cycle
pub struct Processor {
    notes: Arc<dyn NoteRepository>,
    memory: Arc<MemoryStore>,
    enrichment: EnrichmentPipeline,
    synthesizer: InsightSynthesizer,
    enabled: bool,
    in_flight: AtomicBool,
}

impl Processor {
    /// `enabled` reflects whether an API credential is configured; without
    /// one every cycle short-circuits to [`CycleOutcome::Disabled`].
    pub fn new(
        gateway: Arc<dyn LanguageModel>,
        notes: Arc<dyn NoteRepository>,
        memory: Arc<MemoryStore>,
        enabled: bool,
    ) -> Self {
        Self {
            enrichment: EnrichmentPipeline::new(gateway.clone(), notes.clone()),
            synthesizer: InsightSynthesizer::new(gateway),
            notes,
            memory,
            enabled,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one full enrichment + synthesis cycle.
    ///
    /// Single-flight: if a cycle is already running the call returns
    /// [`CycleOutcome::AlreadyRunning`] immediately without issuing any
    /// gateway requests. The in-flight flag is released by a drop guard,
    /// so an erroring cycle can never wedge subsequent runs.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.enabled {
            tracing::debug!("No API credential configured, skipping processing cycle");
            return CycleOutcome::Disabled;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::info!("Processing cycle already running, dropping request");
            return CycleOutcome::AlreadyRunning;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let run_id = format!("run-{}", Uuid::new_v4());
        tracing::info!(run_id = %run_id, "Processing cycle started");

        let notes = match self.notes.list_all().await {
            Ok(notes) => notes,
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "Failed to list notes, aborting cycle");
                return CycleOutcome::Failed;
            }
        };

        let report = self.enrichment.enrich(&notes).await;

        // Re-list so the digest reflects tags and summaries the enrichment
        // pass just filled in; fall back to the stale list on error.
        let notes = match self.notes.list_all().await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "Failed to refresh notes, synthesizing over stale list");
                notes
            }
        };

        let memory = self.memory.load().await;
        let now = Utc::now();

        match self.synthesizer.synthesize(&notes, &memory, now).await {
            Ok(mut merged) => {
                merged.last_processed = Some(now);
                if let Err(e) = self.memory.save(merged).await {
                    tracing::error!(run_id = %run_id, error = %e, "Failed to persist memory, cycle result lost");
                    return CycleOutcome::Failed;
                }
            }
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "Synthesis failed, memory left unchanged");
                return CycleOutcome::Failed;
            }
        }

        tracing::info!(
            run_id = %run_id,
            tagged = report.tagged,
            summarized = report.summarized,
            failed = report.failed,
            "Processing cycle complete"
        );
        CycleOutcome::Completed(report)
    }
}

/// Clears the in-flight flag when the cycle exits, error paths included.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
