//! Corpus-wide synthesis: meta-summary, insights, reminders
//!
//! One generation request per cycle: a digest of the most recent notes plus
//! the prior meta-summary goes out, and a JSON object with `meta_summary`,
//! `insights`, and `reminders` is expected back. The reply is merged into
//! the durable memory under the retention and expiry rules; a malformed
//! reply leaves the memory untouched.

use crate::gateway::{GenerationRequest, LanguageModel};
use crate::memory::{Insight, Memory, Reminder, MAX_INSIGHTS};
use crate::notes::Note;
use crate::{parser, Result};
use chrono::{DateTime, Duration, Local, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Maximum number of notes rendered into the digest. The digest is bounded
/// by note count, never by cutting an individual record short.
const DIGEST_NOTE_CAP: usize = 50;

/// Horizon applied to reminders the model left undated.
const DEFAULT_REMINDER_DAYS: i64 = 7;

/// What a synthesis reply may carry. Every field is optional; an absent
/// field leaves the corresponding memory section alone.
#[derive(Debug, Default)]
pub struct SynthesisResult {
    pub meta_summary: Option<String>,
    pub insights: Option<Vec<NewInsight>>,
    pub reminders: Option<Vec<NewReminder>>,
}

#[derive(Debug)]
pub struct NewInsight {
    pub title: String,
    pub content: String,
}

#[derive(Debug)]
pub struct NewReminder {
    pub content: String,
    pub due_date: Option<String>,
}

impl SynthesisResult {
    /// Lenient extraction from a parsed JSON object: list elements that lack
    /// the required `content` field are dropped individually instead of
    /// spoiling the whole reply.
    fn from_value(value: &Value) -> Self {
        let meta_summary = value
            .get("meta_summary")
            .and_then(Value::as_str)
            .map(str::to_string);

        let insights = value.get("insights").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let content = item.get("content")?.as_str()?.to_string();
                    let title = item
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Some(NewInsight { title, content })
                })
                .collect()
        });

        let reminders = value.get("reminders").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let content = item.get("content")?.as_str()?.to_string();
                    let due_date = item
                        .get("due_date")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    Some(NewReminder { content, due_date })
                })
                .collect()
        });

        Self {
            meta_summary,
            insights,
            reminders,
        }
    }
}

/// Merge a synthesis result into the prior memory.
///
/// Rules:
/// - a present `meta_summary` replaces the old one outright;
/// - new insights are stamped `now`, prepended, and the list is truncated to
///   [`MAX_INSIGHTS`], so the newest run wins ties over older entries;
/// - new reminders missing a due date default to `now` + 7 calendar days;
///   old reminders already past today are dropped; survivors keep their
///   order behind the new entries. New reminders are never filtered by
///   their own freshness.
pub fn merge(mut memory: Memory, result: SynthesisResult, now: DateTime<Utc>) -> Memory {
    let today = now.date_naive();

    if let Some(meta_summary) = result.meta_summary {
        memory.meta_summary = meta_summary;
    }

    if let Some(new_insights) = result.insights {
        let mut merged: Vec<Insight> = new_insights
            .into_iter()
            .map(|i| Insight {
                title: i.title,
                content: i.content,
                timestamp: now,
            })
            .collect();
        merged.append(&mut memory.insights);
        merged.truncate(MAX_INSIGHTS);
        memory.insights = merged;
    }

    if let Some(new_reminders) = result.reminders {
        let default_due = (today + Duration::days(DEFAULT_REMINDER_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let mut merged: Vec<Reminder> = new_reminders
            .into_iter()
            .map(|r| Reminder {
                content: r.content,
                due_date: r.due_date.unwrap_or_else(|| default_due.clone()),
            })
            .collect();
        for old in memory.reminders {
            if old.is_upcoming(today) {
                merged.push(old);
            } else {
                tracing::debug!(due_date = %old.due_date, "Dropping expired reminder");
            }
        }
        memory.reminders = merged;
    }

    memory
}

/// Runs the corpus-wide synthesis pass
pub struct InsightSynthesizer {
    gateway: Arc<dyn LanguageModel>,
}

impl InsightSynthesizer {
    pub fn new(gateway: Arc<dyn LanguageModel>) -> Self {
        Self { gateway }
    }

    /// Synthesize over the recent-note window and merge into `memory`.
    ///
    /// An empty note list is a no-op returning the memory unchanged. A
    /// gateway or parse failure surfaces as an error and the caller keeps
    /// the old memory; no partial field is ever written.
    pub async fn synthesize(
        &self,
        notes: &[Note],
        memory: &Memory,
        now: DateTime<Utc>,
    ) -> Result<Memory> {
        if notes.is_empty() {
            return Ok(memory.clone());
        }

        let digest = build_digest(notes);
        let raw = self
            .gateway
            .generate(GenerationRequest {
                system_prompt: synthesis_system_prompt(&memory.meta_summary),
                user_prompt: format!("Here are my most recent notes:\n{}", digest),
                max_tokens: 2000,
                temperature: 0.7,
            })
            .await?;

        let value = parser::parse_json_object(&raw)?;
        let result = SynthesisResult::from_value(&value);
        Ok(merge(memory.clone(), result, now))
    }
}

/// Render the most recent notes as one-line records, newest window last.
///
/// Stored order is creation order, so the window is the list tail.
fn build_digest(notes: &[Note]) -> String {
    let start = notes.len().saturating_sub(DIGEST_NOTE_CAP);
    notes[start..]
        .iter()
        .map(digest_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn digest_line(note: &Note) -> String {
    let time = note
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let tags = if note.tags.is_empty() {
        "no tags".to_string()
    } else {
        note.tags.join(", ")
    };
    let summary = note
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("no summary");
    format!(
        "ID: {}, time: {}, tags: [{}], summary: {}",
        note.id, time, tags, summary
    )
}

fn synthesis_system_prompt(meta_summary: &str) -> String {
    let prior = if meta_summary.trim().is_empty() {
        "(none)"
    } else {
        meta_summary
    };
    format!(
        "You are an idea-analysis assistant. Study the user's note history, \
         identify the themes and patterns behind it, and suggest what deserves \
         attention next.\n\n\
         Prior meta-summary: {}\n\n\
         Reply with a JSON object containing:\n\
         1. \"meta_summary\": an updated meta-level summary of all the notes\n\
         2. \"insights\": an array of 3-5 new insights, each with \"title\" and \"content\"\n\
         3. \"reminders\": an array of 1-3 reminders for things the user should revisit \
         or act on, each with \"content\" and an optional \"due_date\" (YYYY-MM-DD)",
        prior
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{enriched_note, raw_note, MockGateway};

    fn at(date: &str) -> DateTime<Utc> {
        format!("{}T12:00:00Z", date).parse().unwrap()
    }

    fn insight(title: &str, when: DateTime<Utc>) -> Insight {
        Insight {
            title: title.to_string(),
            content: format!("content of {}", title),
            timestamp: when,
        }
    }

    fn reminder(content: &str, due_date: &str) -> Reminder {
        Reminder {
            content: content.to_string(),
            due_date: due_date.to_string(),
        }
    }

    fn new_insights(titles: &[&str]) -> Option<Vec<NewInsight>> {
        Some(
            titles
                .iter()
                .map(|t| NewInsight {
                    title: t.to_string(),
                    content: format!("content of {}", t),
                })
                .collect(),
        )
    }

    #[test]
    fn test_meta_summary_replaced_when_present() {
        let memory = Memory {
            meta_summary: "old".to_string(),
            ..Memory::default()
        };
        let result = SynthesisResult {
            meta_summary: Some("new".to_string()),
            ..SynthesisResult::default()
        };
        let merged = merge(memory, result, at("2024-01-01"));
        assert_eq!(merged.meta_summary, "new");
    }

    #[test]
    fn test_meta_summary_kept_when_absent() {
        let memory = Memory {
            meta_summary: "old".to_string(),
            ..Memory::default()
        };
        let merged = merge(memory, SynthesisResult::default(), at("2024-01-01"));
        assert_eq!(merged.meta_summary, "old");
    }

    #[test]
    fn test_insights_prepended_and_stamped() {
        let earlier = at("2024-01-01");
        let memory = Memory {
            insights: vec![insight("old", earlier)],
            ..Memory::default()
        };
        let now = at("2024-02-01");
        let result = SynthesisResult {
            insights: new_insights(&["fresh"]),
            ..SynthesisResult::default()
        };

        let merged = merge(memory, result, now);
        assert_eq!(merged.insights.len(), 2);
        assert_eq!(merged.insights[0].title, "fresh");
        assert_eq!(merged.insights[0].timestamp, now);
        assert_eq!(merged.insights[1].title, "old");
    }

    #[test]
    fn test_insight_retention_cap() {
        // Three successive merges of 10+ insights each leave exactly the
        // most recent 10, by merge order.
        let mut memory = Memory::default();
        for round in 0..3 {
            let titles: Vec<String> =
                (0..12).map(|i| format!("r{}-i{}", round, i)).collect();
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
            let result = SynthesisResult {
                insights: new_insights(&refs),
                ..SynthesisResult::default()
            };
            memory = merge(memory, result, at("2024-01-01"));
        }

        assert_eq!(memory.insights.len(), MAX_INSIGHTS);
        for (i, insight) in memory.insights.iter().enumerate() {
            assert_eq!(insight.title, format!("r2-i{}", i));
        }
    }

    #[test]
    fn test_reminder_default_due_date() {
        let result = SynthesisResult {
            reminders: Some(vec![NewReminder {
                content: "revisit".to_string(),
                due_date: None,
            }]),
            ..SynthesisResult::default()
        };

        let merged = merge(Memory::default(), result, at("2024-01-01"));
        assert_eq!(merged.reminders[0].due_date, "2024-01-08");
    }

    #[test]
    fn test_explicit_due_date_kept() {
        let result = SynthesisResult {
            reminders: Some(vec![NewReminder {
                content: "revisit".to_string(),
                due_date: Some("2024-06-01".to_string()),
            }]),
            ..SynthesisResult::default()
        };

        let merged = merge(Memory::default(), result, at("2024-01-01"));
        assert_eq!(merged.reminders[0].due_date, "2024-06-01");
    }

    #[test]
    fn test_expired_old_reminders_dropped_at_merge() {
        let memory = Memory {
            reminders: vec![reminder("stale", "2023-12-31")],
            ..Memory::default()
        };
        let result = SynthesisResult {
            reminders: Some(Vec::new()),
            ..SynthesisResult::default()
        };

        let merged = merge(memory, result, at("2024-01-01"));
        assert!(merged.reminders.is_empty());
    }

    #[test]
    fn test_new_reminders_not_filtered_by_own_freshness() {
        // A reminder the model dates in the past still lands in storage;
        // only *old* entries are pruned at merge time.
        let result = SynthesisResult {
            reminders: Some(vec![NewReminder {
                content: "already late".to_string(),
                due_date: Some("2023-01-01".to_string()),
            }]),
            ..SynthesisResult::default()
        };

        let merged = merge(Memory::default(), result, at("2024-01-01"));
        assert_eq!(merged.reminders.len(), 1);
    }

    #[test]
    fn test_surviving_old_reminders_follow_new_ones() {
        let memory = Memory {
            reminders: vec![
                reminder("still valid", "2024-02-01"),
                reminder("stale", "2023-01-01"),
            ],
            ..Memory::default()
        };
        let result = SynthesisResult {
            reminders: Some(vec![NewReminder {
                content: "fresh".to_string(),
                due_date: Some("2024-03-01".to_string()),
            }]),
            ..SynthesisResult::default()
        };

        let merged = merge(memory, result, at("2024-01-01"));
        let contents: Vec<&str> = merged.reminders.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["fresh", "still valid"]);
    }

    #[test]
    fn test_absent_reminders_key_leaves_old_set_alone() {
        let memory = Memory {
            reminders: vec![reminder("stale", "2023-01-01")],
            ..Memory::default()
        };

        let merged = merge(memory, SynthesisResult::default(), at("2024-01-01"));
        // Even the expired entry stays in storage until the next merge
        // that actually carries a reminders list.
        assert_eq!(merged.reminders.len(), 1);
    }

    #[test]
    fn test_unparseable_old_due_date_dropped() {
        let memory = Memory {
            reminders: vec![reminder("when?", "sometime soon")],
            ..Memory::default()
        };
        let result = SynthesisResult {
            reminders: Some(Vec::new()),
            ..SynthesisResult::default()
        };

        let merged = merge(memory, result, at("2024-01-01"));
        assert!(merged.reminders.is_empty());
    }

    #[test]
    fn test_from_value_lenient_elements() {
        let value: Value = serde_json::from_str(
            r#"{
                "meta_summary": "themes",
                "insights": [
                    {"title": "t", "content": "c"},
                    {"title": "missing content"},
                    {"content": "untitled"}
                ],
                "reminders": [
                    {"content": "r", "due_date": "2024-05-01"},
                    {"due_date": "2024-05-01"},
                    {"content": "undated"}
                ]
            }"#,
        )
        .unwrap();

        let result = SynthesisResult::from_value(&value);
        assert_eq!(result.meta_summary.as_deref(), Some("themes"));

        let insights = result.insights.unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "t");
        assert_eq!(insights[1].title, "");

        let reminders = result.reminders.unwrap();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].due_date.as_deref(), Some("2024-05-01"));
        assert!(reminders[1].due_date.is_none());
    }

    #[test]
    fn test_from_value_absent_sections() {
        let value: Value = serde_json::from_str("{}").unwrap();
        let result = SynthesisResult::from_value(&value);
        assert!(result.meta_summary.is_none());
        assert!(result.insights.is_none());
        assert!(result.reminders.is_none());
    }

    #[test]
    fn test_digest_caps_by_note_count() {
        let notes: Vec<Note> = (1..=60).map(|i| raw_note(i, "idea")).collect();
        let digest = build_digest(&notes);

        assert_eq!(digest.lines().count(), DIGEST_NOTE_CAP);
        // The window is the most recent tail of the stored order.
        assert!(digest.lines().next().unwrap().starts_with("ID: 11,"));
        assert!(digest.lines().last().unwrap().starts_with("ID: 60,"));
    }

    #[test]
    fn test_digest_markers_for_missing_fields() {
        let digest = build_digest(&[raw_note(1, "idea")]);
        assert!(digest.contains("[no tags]"));
        assert!(digest.contains("summary: no summary"));

        let digest = build_digest(&[enriched_note(2, "idea")]);
        assert!(digest.contains("[tagged]"));
        assert!(digest.contains("summary: summary of idea"));
    }

    #[tokio::test]
    async fn test_empty_note_list_is_a_noop() {
        let gateway = Arc::new(MockGateway::new());
        let synthesizer = InsightSynthesizer::new(gateway.clone() as _);
        let memory = Memory {
            meta_summary: "kept".to_string(),
            ..Memory::default()
        };

        let merged = synthesizer
            .synthesize(&[], &memory, Utc::now())
            .await
            .unwrap();
        assert_eq!(merged, memory);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_full_synthesis_pass() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok(
            r#"{
                "meta_summary": "mostly tooling ideas",
                "insights": [{"title": "Tooling focus", "content": "recent notes cluster on tooling"}],
                "reminders": [{"content": "prototype the parser"}]
            }"#,
        );
        let synthesizer = InsightSynthesizer::new(gateway.clone() as _);
        let now = at("2024-01-01");

        let merged = synthesizer
            .synthesize(&[enriched_note(1, "build a parser")], &Memory::default(), now)
            .await
            .unwrap();

        assert_eq!(merged.meta_summary, "mostly tooling ideas");
        assert_eq!(merged.insights.len(), 1);
        assert_eq!(merged.reminders[0].due_date, "2024-01-08");

        // Prior meta-summary and the digest both ride in the request.
        let call = &gateway.calls()[0];
        assert!(call.system_prompt.contains("Prior meta-summary: (none)"));
        assert!(call.user_prompt.contains("ID: 1,"));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_parse_error() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_ok("I could not produce JSON today, sorry.");
        let synthesizer = InsightSynthesizer::new(gateway.clone() as _);

        let err = synthesizer
            .synthesize(&[raw_note(1, "idea")], &Memory::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_err("quota exceeded");
        let synthesizer = InsightSynthesizer::new(gateway.clone() as _);

        let err = synthesizer
            .synthesize(&[raw_note(1, "idea")], &Memory::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Gateway(_)));
    }
}
