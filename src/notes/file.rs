//! JSON-file-backed note store
//!
//! A single `notes.json` under the data directory holds the full note list.
//! It is loaded once at startup and rewritten through a temp file + rename
//! on every change, so a concurrent reader never observes a partial write.

use super::{Note, NoteRepository};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// File-backed note repository
#[derive(Debug)]
pub struct FileNoteStore {
    path: PathBuf,
    notes: RwLock<Vec<Note>>,
}

impl FileNoteStore {
    /// Open (or create) the store at `<data_dir>/notes.json`.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join("notes.json");

        let notes = match tokio::fs::read_to_string(&path).await {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                Error::Persistence(format!("failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            notes: RwLock::new(notes),
        })
    }

    /// Append a new note, returning it with its assigned ID.
    pub async fn create(&self, content: &str) -> Result<Note> {
        let mut notes = self.notes.write().await;
        let id = notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let note = Note {
            id,
            content: content.to_string(),
            timestamp: Utc::now(),
            tags: Vec::new(),
            summary: None,
        };
        notes.push(note.clone());
        self.persist(&notes).await?;
        Ok(note)
    }

    /// Replace the content of a note, returning whether it existed.
    ///
    /// Tags and summary are left as they are; content edits do not reset
    /// earlier enrichment results.
    pub async fn update_content(&self, id: u64, content: &str) -> Result<bool> {
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.id == id) {
            Some(note) => note.content = content.to_string(),
            None => return Ok(false),
        }
        self.persist(&notes).await?;
        Ok(true)
    }

    /// Delete a note by ID, returning whether it existed.
    pub async fn delete(&self, id: u64) -> Result<bool> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.persist(&notes).await?;
        Ok(true)
    }

    /// Case-insensitive substring search over note content.
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let needle = query.to_lowercase();
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .filter(|n| n.content.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn persist(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string_pretty(notes)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for FileNoteStore {
    async fn list_all(&self) -> Result<Vec<Note>> {
        Ok(self.notes.read().await.clone())
    }

    async fn get(&self, id: u64) -> Result<Option<Note>> {
        Ok(self.notes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn set_tags(&self, id: u64, tags: Vec<String>) -> Result<()> {
        let mut notes = self.notes.write().await;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::Persistence(format!("note {} not found", id)))?;
        note.tags = tags;
        self.persist(&notes).await
    }

    async fn set_summary(&self, id: u64, summary: String) -> Result<()> {
        let mut notes = self.notes.write().await;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::Persistence(format!("note {} not found", id)))?;
        note.summary = Some(summary);
        self.persist(&notes).await
    }
}
