//! Ad-hoc question answering over the consolidated memory
//!
//! Read-only: the assistant builds a bounded context from the memory (the
//! meta-summary, the freshest insights, the nearest upcoming reminders) and
//! sends a single generation request. It never touches the note repository
//! and never mutates the memory. Every internal failure is flattened into a
//! user-readable string.

use crate::gateway::{GenerationRequest, LanguageModel};
use crate::memory::Memory;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Insights included in the context, newest first.
const CONTEXT_INSIGHTS: usize = 5;

/// Upcoming reminders included in the context, soonest first.
const CONTEXT_REMINDERS: usize = 3;

/// Returned without any network call when no API credential is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "The AI assistant is not configured. Set an API key in the configuration file to enable queries.";

/// Answers free-text questions about the note history
pub struct QueryAssistant {
    gateway: Arc<dyn LanguageModel>,
    enabled: bool,
}

impl QueryAssistant {
    pub fn new(gateway: Arc<dyn LanguageModel>, enabled: bool) -> Self {
        Self { gateway, enabled }
    }

    /// Answer `question` using the memory as context.
    ///
    /// Gateway errors come back as an apologetic string, never as an error
    /// the caller has to handle.
    pub async fn answer(&self, question: &str, memory: &Memory) -> String {
        if !self.enabled {
            return NOT_CONFIGURED_MESSAGE.to_string();
        }

        let context = build_context(memory, Utc::now().date_naive());
        let request = GenerationRequest {
            system_prompt: format!(
                "You are an idea-analysis assistant with context about the user's \
                 note history. Answer the user's question based on the context \
                 below, in a friendly and helpful way. If the question falls \
                 outside the context, say so honestly.\n\nContext:\n{}",
                context
            ),
            user_prompt: question.to_string(),
            max_tokens: 500,
            temperature: 0.7,
        };

        match self.gateway.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Query failed");
                format!("Sorry, the query failed: {}", e)
            }
        }
    }
}

fn build_context(memory: &Memory, today: NaiveDate) -> String {
    let meta = if memory.meta_summary.trim().is_empty() {
        "(none)"
    } else {
        &memory.meta_summary
    };

    let mut context = format!("Meta-summary: {}\n\nRecent insights:\n", meta);
    for (i, insight) in memory.insights.iter().take(CONTEXT_INSIGHTS).enumerate() {
        context.push_str(&format!("{}. {}: {}\n", i + 1, insight.title, insight.content));
    }

    context.push_str("\nUpcoming reminders:\n");
    let mut upcoming = memory.upcoming_reminders(today);
    upcoming.sort_by_key(|r| r.due());
    for (i, reminder) in upcoming.iter().take(CONTEXT_REMINDERS).enumerate() {
        context.push_str(&format!("{}. {}: {}\n", i + 1, reminder.due_date, reminder.content));
    }

    context
}
