//! Storage Port - Key-Value Persistence Interface
//!
//! The only way the sheet reaches durable storage. Blobs are opaque
//! JSON text; keys are namespaced by application, player and slot
//! (see `StorageKeys`). Only the persistence coordinator calls this.

use async_trait::async_trait;

/// Trait for key-value storage backends.
///
/// A write that has started always runs to completion; callers never
/// cancel an in-flight `set`.
#[async_trait]
pub trait KeyValueStorage: Send + Sync + 'static {
  /// Read the blob stored under `key`, `None` when absent.
  async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

  /// Store `blob` under `key`, replacing any previous value.
  async fn set(&self, key: &str, blob: &str) -> anyhow::Result<()>;
}

/// Builds the namespaced keys for one application and (optional) player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
  /// Application namespace.
  app_id: String,
  /// Player identity, when the host exposes one.
  player_id: Option<String>,
}

impl StorageKeys {
  /// Create a key builder.
  pub fn new(app_id: impl Into<String>, player_id: Option<String>) -> Self {
    Self {
      app_id: app_id.into(),
      player_id,
    }
  }

  fn prefix(&self) -> String {
    match &self.player_id {
      Some(player) => format!("{}/players/{player}", self.app_id),
      None => self.app_id.clone(),
    }
  }

  /// Key holding the record of `slot`.
  pub fn slot(&self, slot: &str) -> String {
    format!("{}/save_slot_{slot}", self.prefix())
  }

  /// Key holding the most recently active slot.
  pub fn last_slot(&self) -> String {
    format!("{}/last_save_slot", self.prefix())
  }

  /// Room-wide metadata key for shared sheet data.
  pub fn room_data(&self) -> String {
    format!("{}/room_data", self.app_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_keys_with_player() {
    let keys = StorageKeys::new("quest.jelonek.owlbear.eem", Some("p-1".to_string()));
    assert_eq!(keys.slot("2"), "quest.jelonek.owlbear.eem/players/p-1/save_slot_2");
    assert_eq!(keys.last_slot(), "quest.jelonek.owlbear.eem/players/p-1/last_save_slot");
    assert_eq!(keys.room_data(), "quest.jelonek.owlbear.eem/room_data");
  }

  #[test]
  fn test_keys_without_player() {
    let keys = StorageKeys::new("app", None);
    assert_eq!(keys.slot("1"), "app/save_slot_1");
    assert_eq!(keys.last_slot(), "app/last_save_slot");
  }
}
