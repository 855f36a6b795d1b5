//! Shared test doubles for the pipeline tests

use crate::gateway::{GenerationRequest, LanguageModel};
use crate::notes::{Note, NoteRepository};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

/// Scripted fake gateway: responses are consumed FIFO, every request is
/// recorded, and an optional delay simulates a slow network call.
pub struct MockGateway {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<GenerationRequest>>,
    delay: Option<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn push_ok(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for MockGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(Error::Gateway(message)),
            None => Err(Error::Gateway("no scripted response".to_string())),
        }
    }
}

/// In-memory note repository for tests
pub struct MemNoteRepository {
    notes: RwLock<Vec<Note>>,
}

impl MemNoteRepository {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
        }
    }
}

#[async_trait]
impl NoteRepository for MemNoteRepository {
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
        Ok(())
    }

    async fn set_summary(&self, id: u64, summary: String) -> Result<()> {
        let mut notes = self.notes.write().await;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::Persistence(format!("note {} not found", id)))?;
        note.summary = Some(summary);
        Ok(())
    }
}

/// A note with neither tags nor summary.
pub fn raw_note(id: u64, content: &str) -> Note {
    Note {
        id,
        content: content.to_string(),
        timestamp: Utc::now(),
        tags: Vec::new(),
        summary: None,
    }
}

/// A note with both tags and a summary already filled in.
pub fn enriched_note(id: u64, content: &str) -> Note {
    Note {
        id,
        content: content.to_string(),
        timestamp: Utc::now(),
        tags: vec!["tagged".to_string()],
        summary: Some(format!("summary of {}", content)),
    }
}
