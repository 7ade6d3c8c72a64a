// src/snapshot.rs
//! Durable copy of the most recent fetch. One flat JSON file per live route,
//! overwritten wholesale; concurrent writers are last-writer-wins.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

use crate::upstream::Message;

#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot with `messages`.
    async fn persist(&self, messages: &[Message]) -> Result<()>;
    /// Raw bytes of the stored snapshot, exactly as written.
    async fn load_raw(&self) -> Result<Vec<u8>>;
    fn describe(&self) -> String;
}

/// Pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn persist(&self, messages: &[Message]) -> Result<()> {
        let body = serde_json::to_vec_pretty(messages).context("serializing snapshot")?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing snapshot {}", self.path.display()))
    }

    async fn load_raw(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading snapshot {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// --- Test helper ---
/// In-memory store for tests. Not meant for production wiring; a poisoned lock panics.
pub struct MemorySnapshotStore {
    pub writes: Mutex<Vec<Vec<Message>>>,
    fail_writes: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            writes: Mutex::new(vec![]),
            fail_writes: false,
        }
    }

    /// A store whose every write errors, for exercising the best-effort path.
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(vec![]),
            fail_writes: true,
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn persist(&self, messages: &[Message]) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("snapshot store is read-only"));
        }
        self.writes.lock().unwrap().push(messages.to_vec());
        Ok(())
    }

    async fn load_raw(&self) -> Result<Vec<u8>> {
        let writes = self.writes.lock().unwrap();
        let last = writes
            .last()
            .ok_or_else(|| anyhow!("no snapshot written yet"))?;
        Ok(serde_json::to_vec_pretty(last)?)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
