//! Configuration Module - TOML-based Sheet Configuration
//!
//! Loads and validates configuration from `config.toml`. Storage
//! namespace, debounce timing and roll presentation are externalized
//! here; the domain layer only sees the values it is handed.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

pub use loader::load_config;

/// Top-level sheet configuration.
///
/// Every section is optional in the file; missing values take the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Application identity and logging.
  #[serde(default)]
  pub app: AppSection,
  /// Storage backend and save timing.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Dice and roll presentation.
  #[serde(default)]
  pub rolls: RollConfig,
  /// Local player identity.
  #[serde(default)]
  pub player: PlayerConfig,
}

/// Application identity.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Namespace prefix for every storage and room metadata key.
  #[serde(default = "default_app_id")]
  pub id: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      id: default_app_id(),
      log_level: default_log_level(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for per-key JSON files. Empty keeps everything in memory.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  /// Quiet period before a pending save is written.
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      debounce_ms: default_debounce_ms(),
    }
  }
}

impl PersistenceConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

/// Roll presentation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RollConfig {
  /// Faces on the check die.
  #[serde(default = "default_die_sides")]
  pub die_sides: i32,
  /// Lines kept in the shared roll history.
  #[serde(default = "default_history_max_entries")]
  pub history_max_entries: usize,
  /// How long roll notifications stay up.
  #[serde(default = "default_notification_ms")]
  pub notification_ms: u64,
  /// How long shared-entry notifications stay up.
  #[serde(default = "default_share_notification_ms")]
  pub share_notification_ms: u64,
}

impl Default for RollConfig {
  fn default() -> Self {
    Self {
      die_sides: default_die_sides(),
      history_max_entries: default_history_max_entries(),
      notification_ms: default_notification_ms(),
      share_notification_ms: default_share_notification_ms(),
    }
  }
}

impl RollConfig {
  pub fn notification(&self) -> Duration {
    Duration::from_millis(self.notification_ms)
  }

  pub fn share_notification(&self) -> Duration {
    Duration::from_millis(self.share_notification_ms)
  }
}

/// Player identity. Both fields optional; without an id, storage keys
/// omit the player segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerConfig {
  /// Stable player id.
  #[serde(default)]
  pub id: Option<String>,
  /// Display name used in roll titles.
  #[serde(default)]
  pub name: Option<String>,
}

// ── Default value functions ──

fn default_app_id() -> String {
  "quest.jelonek.owlbear.eem".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_debounce_ms() -> u64 {
  500
}

fn default_die_sides() -> i32 {
  12
}

fn default_history_max_entries() -> usize {
  18
}

fn default_notification_ms() -> u64 {
  6000
}

fn default_share_notification_ms() -> u64 {
  12000
}
