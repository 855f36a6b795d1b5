//! Per-note enrichment: tags and summaries
//!
//! Each note missing tags or a summary gets one low-temperature generation
//! request per missing field. A failure on one note is logged and skipped;
//! it never aborts the rest of the batch. Notes that already carry both
//! fields are not touched at all, so re-running is free.

use crate::gateway::{GenerationRequest, LanguageModel};
use crate::notes::{Note, NoteRepository};
use crate::{parser, Result};
use std::sync::Arc;

const TAG_SYSTEM_PROMPT: &str = "You are a tagging assistant. Generate 3-5 short keyword tags \
     capturing the main topics of the text. Each tag is a single word or short phrase. \
     Reply with a JSON array of strings and nothing else.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a summarization assistant. Reply with a single short \
     sentence summarizing the text.";

/// Counts of what an enrichment pass touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub tagged: usize,
    pub summarized: usize,
    pub failed: usize,
}

/// Fills in missing tags and summaries on raw notes
pub struct EnrichmentPipeline {
    gateway: Arc<dyn LanguageModel>,
    notes: Arc<dyn NoteRepository>,
}

impl EnrichmentPipeline {
    pub fn new(gateway: Arc<dyn LanguageModel>, notes: Arc<dyn NoteRepository>) -> Self {
        Self { gateway, notes }
    }

    /// Enrich every note that is missing tags or a summary.
    ///
    /// Tags are only stored when the model produced at least one; summaries
    /// only when non-empty. The two fields are independent writes, so a
    /// failing summary never rolls back a stored tag list.
    pub async fn enrich(&self, notes: &[Note]) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();

        for note in notes {
            if note.needs_tags() {
                match self.generate_tags(&note.content).await {
                    Ok(tags) if !tags.is_empty() => {
                        match self.notes.set_tags(note.id, tags).await {
                            Ok(()) => report.tagged += 1,
                            Err(e) => {
                                report.failed += 1;
                                tracing::warn!(note_id = note.id, error = %e, "Failed to store tags");
                            }
                        }
                    }
                    Ok(_) => {
                        tracing::debug!(note_id = note.id, "Model produced no tags, skipping");
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(note_id = note.id, error = %e, "Tag generation failed");
                    }
                }
            }

            if note.needs_summary() {
                match self.generate_summary(&note.content).await {
                    Ok(summary) if !summary.is_empty() => {
                        match self.notes.set_summary(note.id, summary).await {
                            Ok(()) => report.summarized += 1,
                            Err(e) => {
                                report.failed += 1;
                                tracing::warn!(note_id = note.id, error = %e, "Failed to store summary");
                            }
                        }
                    }
                    Ok(_) => {
                        tracing::debug!(note_id = note.id, "Model produced no summary, skipping");
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(note_id = note.id, error = %e, "Summary generation failed");
                    }
                }
            }
        }

        report
    }

    async fn generate_tags(&self, content: &str) -> Result<Vec<String>> {
        let raw = self
            .gateway
            .generate(GenerationRequest {
                system_prompt: TAG_SYSTEM_PROMPT.to_string(),
                user_prompt: content.to_string(),
                max_tokens: 100,
                temperature: 0.3,
            })
            .await?;
        Ok(parser::parse_string_list(&raw))
    }

    async fn generate_summary(&self, content: &str) -> Result<String> {
        let raw = self
            .gateway
            .generate(GenerationRequest {
                system_prompt: SUMMARY_SYSTEM_PROMPT.to_string(),
                user_prompt: content.to_string(),
                max_tokens: 60,
                temperature: 0.3,
            })
            .await?;
        Ok(parser::parse_short_text(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{enriched_note, raw_note, MemNoteRepository, MockGateway};

    fn pipeline(
        gateway: &Arc<MockGateway>,
        repo: &Arc<MemNoteRepository>,
    ) -> EnrichmentPipeline {
        EnrichmentPipeline::new(gateway.clone() as Arc<dyn LanguageModel>, repo.clone() as _)
    }

    #[tokio::test]
    async fn test_enriches_missing_fields() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok(r#"["rust", "async"]"#);
        gateway.push_ok("A note about async Rust.");
        let repo = Arc::new(MemNoteRepository::new(vec![raw_note(1, "tokio internals")]));

        let report = pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        assert_eq!(report, EnrichmentReport { tagged: 1, summarized: 1, failed: 0 });
        let note = repo.get(1).await.unwrap().unwrap();
        assert_eq!(note.tags, vec!["rust", "async"]);
        assert_eq!(note.summary.as_deref(), Some("A note about async Rust."));
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_enriched_notes_are_skipped() {
        let gateway = Arc::new(MockGateway::new());
        let repo = Arc::new(MemNoteRepository::new(vec![enriched_note(1, "done")]));

        let report = pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        assert_eq!(report, EnrichmentReport::default());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_batch() {
        let gateway = Arc::new(MockGateway::new());
        // First note: both calls fail. Second note: both succeed.
        gateway.push_err("connection refused");
        gateway.push_err("connection refused");
        gateway.push_ok(r#"["ok"]"#);
        gateway.push_ok("fine");
        let repo = Arc::new(MemNoteRepository::new(vec![
            raw_note(1, "first"),
            raw_note(2, "second"),
        ]));

        let report = pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        assert_eq!(report.failed, 2);
        assert_eq!(report.tagged, 1);
        assert_eq!(report.summarized, 1);
        let second = repo.get(2).await.unwrap().unwrap();
        assert_eq!(second.tags, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_empty_generation_is_not_stored() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok("[]");
        gateway.push_ok("   ");
        let repo = Arc::new(MemNoteRepository::new(vec![raw_note(1, "idea")]));

        let report = pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        assert_eq!(report, EnrichmentReport::default());
        let note = repo.get(1).await.unwrap().unwrap();
        assert!(note.tags.is_empty());
        assert!(note.summary.is_none());
    }

    #[tokio::test]
    async fn test_partial_note_only_requests_missing_field() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok("A summary.");
        let mut note = raw_note(1, "idea");
        note.tags = vec!["existing".to_string()];
        let repo = Arc::new(MemNoteRepository::new(vec![note]));

        let report = pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        assert_eq!(report.summarized, 1);
        assert_eq!(report.tagged, 0);
        assert_eq!(gateway.call_count(), 1);
        // The one call was the summary request, not a tag request.
        assert!(gateway.calls()[0].system_prompt.contains("summarization"));
    }

    #[tokio::test]
    async fn test_low_temperature_sampling() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok(r#"["a"]"#);
        gateway.push_ok("s");
        let repo = Arc::new(MemNoteRepository::new(vec![raw_note(1, "idea")]));

        pipeline(&gateway, &repo)
            .enrich(&repo.list_all().await.unwrap())
            .await;

        for call in gateway.calls() {
            assert!(call.temperature <= 0.3);
        }
    }
}
