//! In-Memory Room - Shared Metadata for a Single Process
//!
//! Holds the room metadata map locally and broadcasts roll-history
//! changes over a `watch` channel, the way a networked room would
//! push updates to every connected sheet.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::ports::host::{RoomData, RoomMetadata};

pub struct InMemoryRoom {
    entries: Mutex<HashMap<String, RoomData>>,
    changes: watch::Sender<RoomData>,
}

impl Default for InMemoryRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoom {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(RoomData::default());
        Self {
            entries: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

#[async_trait]
impl RoomMetadata for InMemoryRoom {
    async fn get(&self, key: &str) -> Result<Option<RoomData>> {
        let Ok(entries) = self.entries.lock() else {
            bail!("room metadata lock poisoned");
        };
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, data: RoomData) -> Result<()> {
        {
            let Ok(mut entries) = self.entries.lock() else {
                bail!("room metadata lock poisoned");
            };
            entries.insert(key.to_string(), data.clone());
        }
        debug!(key, lines = data.roll_history.lines().count(), "Room metadata updated");
        self.changes.send_replace(data);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<RoomData> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_notifies_subscribers() {
        let room = InMemoryRoom::new();
        let mut rx = room.subscribe();
        room.set(
            "app/room_data",
            RoomData {
                roll_history: "line".to_string(),
            },
        )
        .await
        .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().roll_history, "line");
        assert_eq!(
            room.get("app/room_data").await.unwrap().unwrap().roll_history,
            "line"
        );
        assert!(room.get("other").await.unwrap().is_none());
    }
}
