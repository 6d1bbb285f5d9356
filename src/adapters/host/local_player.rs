//! Local Player - Static Identity from Configuration
//!
//! Stands in for the host platform's player service when the sheet
//! runs outside a shared room. Both values come from `[player]`.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::PlayerConfig;
use crate::ports::host::PlayerIdentity;

/// Identity fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct LocalPlayer {
    id: Option<String>,
    name: Option<String>,
}

impl LocalPlayer {
    pub fn new(id: Option<String>, name: Option<String>) -> Self {
        Self { id, name }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.id.clone(), config.name.clone())
    }
}

#[async_trait]
impl PlayerIdentity for LocalPlayer {
    async fn player_id(&self) -> Result<Option<String>> {
        Ok(self.id.clone().filter(|id| !id.is_empty()))
    }

    async fn player_name(&self) -> Result<Option<String>> {
        Ok(self.name.clone().filter(|name| !name.is_empty()))
    }
}
