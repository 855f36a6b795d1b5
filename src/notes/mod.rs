//! Note storage
//!
//! Notes are owned by the repository. The processing pipeline only reads
//! them and writes back tags and summaries; it never creates or deletes a
//! note. Tag and summary updates are independent per-field operations.

pub mod file;

pub use file::FileNoteStore;

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single journal note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,

    /// Raw note text as the user entered it
    pub content: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// AI-generated tags; empty until enrichment runs
    #[serde(default)]
    pub tags: Vec<String>,

    /// AI-generated one-line summary; absent until enrichment runs
    #[serde(default)]
    pub summary: Option<String>,
}

impl Note {
    /// True when the note still needs tags.
    pub fn needs_tags(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when the note still needs a summary.
    pub fn needs_summary(&self) -> bool {
        self.summary
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
    }
}

/// CRUD store for notes, as seen by the processing core.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes in stored (creation) order.
    async fn list_all(&self) -> Result<Vec<Note>>;

    /// Fetch a single note.
    async fn get(&self, id: u64) -> Result<Option<Note>>;

    /// Replace the tags of a note.
    async fn set_tags(&self, id: u64, tags: Vec<String>) -> Result<()>;

    /// Replace the summary of a note.
    async fn set_summary(&self, id: u64, summary: String) -> Result<()>;
}
