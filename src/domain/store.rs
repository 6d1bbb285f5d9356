//! Attribute store: the bound field values of the sheet.
//!
//! Holds one normalised string per catalog key. Writes report the
//! value they replaced so listeners can compute deltas. The store has
//! no notion of persistence; the sheet use case decides what to do
//! with each change based on its [`WriteOrigin`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attribute::{self, AttributeKind};

/// Who caused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteOrigin {
    /// Direct user edit. The only origin that triggers propagation.
    User,
    /// Side effect computed by the sheet itself. Persisted, never propagated.
    Script,
    /// Load or import in progress. Neither persisted nor propagated.
    Load,
}

/// A single applied write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub key: String,
    pub previous: String,
    pub current: String,
    pub origin: WriteOrigin,
}

#[derive(Debug, Clone)]
pub struct AttributeStore {
    values: BTreeMap<String, String>,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeStore {
    /// A store holding every attribute's declared default.
    pub fn new() -> Self {
        let values = attribute::catalog()
            .map(|def| (def.key.to_string(), def.default.to_string()))
            .collect();
        Self { values }
    }

    /// Current value of `key`, or `""` when unset or unknown.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Current values of `keys`; unknown keys read as `""`.
    pub fn get(&self, keys: &[&str]) -> BTreeMap<String, String> {
        keys.iter()
            .map(|k| ((*k).to_string(), self.value(k).to_string()))
            .collect()
    }

    /// Integer prefix of `key`'s value, or zero.
    pub fn int(&self, key: &str) -> i64 {
        attribute::parse_int_prefix(self.value(key)).unwrap_or(0)
    }

    /// Whether signed attributes are currently bounded to [-3, +3].
    pub fn clamp_enabled(&self) -> bool {
        self.value("clamp_modifiers") == "true"
    }

    /// Every bound value.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Normalise and store `raw` under `key`.
    ///
    /// Keys outside the catalog have no bound field and are ignored.
    /// Load writes are stored without clamping; validation runs after
    /// the whole record has been applied and clamps then.
    pub fn write(&mut self, key: &str, raw: &str, origin: WriteOrigin) -> Option<AttributeChange> {
        let Some(def) = attribute::lookup(key) else {
            debug!(key, "No bound field for attribute, ignoring write");
            return None;
        };

        let clamp = origin != WriteOrigin::Load && self.clamp_enabled();
        let current = match def.kind {
            AttributeKind::Unsigned if origin == WriteOrigin::User && raw.trim().is_empty() => {
                "0".to_string()
            }
            kind => kind.normalize(raw, clamp),
        };

        let previous = self
            .values
            .insert(def.key.to_string(), current.clone())
            .unwrap_or_default();

        Some(AttributeChange {
            key: def.key.to_string(),
            previous,
            current,
            origin,
        })
    }

    /// Restore `keys` to their declared defaults.
    pub fn reset(&mut self, keys: &[&str]) {
        for key in keys {
            if let Some(def) = attribute::lookup(key) {
                self.values.insert(def.key.to_string(), def.default.to_string());
            }
        }
    }

    /// Restore every attribute to its declared default.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }
}
