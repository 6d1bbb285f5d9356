//! Host Port - Player Identity and Room Metadata
//!
//! The host platform tells us who the player is and carries a small
//! room-wide metadata map shared by everyone at the table. The sheet
//! only reads and writes its own `<app-id>/room_data` entry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Payload stored under the sheet's room metadata key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomData {
  /// Newest-first roll log, one entry per line.
  #[serde(default)]
  pub roll_history: String,
}

/// Trait for player identity lookups.
#[async_trait]
pub trait PlayerIdentity: Send + Sync + 'static {
  /// Stable player id, `None` when the host has no identity concept.
  async fn player_id(&self) -> anyhow::Result<Option<String>>;

  /// Display name of the player.
  async fn player_name(&self) -> anyhow::Result<Option<String>>;
}

/// Trait for room-wide metadata transport.
#[async_trait]
pub trait RoomMetadata: Send + Sync + 'static {
  /// Read the payload under `key`.
  async fn get(&self, key: &str) -> anyhow::Result<Option<RoomData>>;

  /// Replace the payload under `key`.
  async fn set(&self, key: &str, data: RoomData) -> anyhow::Result<()>;

  /// Observe changes to the roll history made by anyone in the room.
  fn subscribe(&self) -> watch::Receiver<RoomData>;
}
