//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    app_id = %config.app.id,
    data_dir = %config.persistence.data_dir,
    debounce_ms = config.persistence.debounce_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
///
/// # Errors
/// TOML syntax errors and validation failures.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.app.id.is_empty(), "app.id must not be empty");
  anyhow::ensure!(
    !config.app.id.contains('/'),
    "app.id must not contain '/', got {}",
    config.app.id
  );

  anyhow::ensure!(
    config.persistence.debounce_ms <= 60_000,
    "persistence.debounce_ms must be at most 60000, got {}",
    config.persistence.debounce_ms
  );

  anyhow::ensure!(
    config.rolls.die_sides > 0,
    "rolls.die_sides must be positive, got {}",
    config.rolls.die_sides
  );
  anyhow::ensure!(
    config.rolls.history_max_entries > 0,
    "rolls.history_max_entries must be positive"
  );

  if let Some(id) = &config.player.id {
    anyhow::ensure!(!id.contains('/'), "player.id must not contain '/', got {id}");
  }

  Ok(())
}
