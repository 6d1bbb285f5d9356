//! In-Memory Storage - Volatile Key-Value Store with Write Journal
//!
//! Used by the shell when no data directory is configured, and by
//! tests that need to count or inspect every write the persistence
//! coordinator performs. Writes can be made to fail on demand.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::ports::storage::KeyValueStorage;

/// One recorded `set` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub key: String,
    pub blob: String,
}

/// HashMap-backed store that remembers every write in order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, String>>,
    journal: Mutex<Vec<JournalEntry>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` without journalling it.
    pub fn seed(&self, key: &str, blob: &str) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_string(), blob.to_string());
        }
    }

    /// Every write so far, oldest first.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Writes made to `key` so far.
    pub fn writes_to(&self, key: &str) -> usize {
        self.journal().iter().filter(|e| e.key == key).count()
    }

    /// Current blob under `key`, bypassing the async port.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.blobs.lock().ok().and_then(|b| b.get(key).cloned())
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, blob: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("storage unavailable");
        }
        let Ok(mut blobs) = self.blobs.lock() else {
            bail!("storage lock poisoned");
        };
        blobs.insert(key.to_string(), blob.to_string());
        drop(blobs);

        if let Ok(mut journal) = self.journal.lock() {
            journal.push(JournalEntry {
                key: key.to_string(),
                blob: blob.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_journal_records_writes() {
        let storage = MemoryStorage::new();
        storage.seed("a", "seeded");
        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.journal().len(), 2);
        assert_eq!(storage.writes_to("a"), 1);
    }

    #[tokio::test]
    async fn test_failing_writes_leave_state() {
        let storage = MemoryStorage::new();
        storage.set("a", "1").await.unwrap();
        storage.set_fail_writes(true);
        assert!(storage.set("a", "2").await.is_err());
        assert_eq!(storage.peek("a").as_deref(), Some("1"));
    }
}
