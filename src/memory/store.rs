//! Durable storage for the consolidated [`Memory`]
//!
//! One `memory.json` under the data directory, read as a whole and replaced
//! as a whole; the temp-file + rename write keeps a concurrent reader from
//! ever observing a partial record. A missing or corrupt file degrades to
//! empty defaults instead of failing startup.

use super::types::Memory;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Owner of the single durable [`Memory`] record
pub struct MemoryStore {
    path: PathBuf,
    memory: RwLock<Memory>,
}

impl MemoryStore {
    /// Open the store at `<data_dir>/memory.json`, falling back to empty
    /// defaults when the file is missing or unreadable.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join("memory.json");

        let memory = match tokio::fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(memory) => memory,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Corrupt memory file, starting from empty defaults"
                    );
                    Memory::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Memory::default(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read memory file, starting from empty defaults"
                );
                Memory::default()
            }
        };

        Ok(Self {
            path,
            memory: RwLock::new(memory),
        })
    }

    /// Current memory as a transient copy.
    pub async fn load(&self) -> Memory {
        self.memory.read().await.clone()
    }

    /// Replace the memory wholesale and persist it.
    ///
    /// There is no partial-field update: callers merge into a copy from
    /// [`load`](Self::load) and hand the whole result back here.
    pub async fn save(&self, memory: Memory) -> Result<()> {
        let json = serde_json::to_string_pretty(&memory)?;
        {
            let mut guard = self.memory.write().await;
            *guard = memory;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
