//! Prompt Port - Asynchronous Modal Interface
//!
//! Asks the user for a single number. Dismissing the modal yields
//! `None`, which callers treat as "abort the whole action" rather
//! than as zero.

use async_trait::async_trait;

/// What the modal should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDescriptor {
  /// Modal identifier.
  pub id: String,
  /// Title shown above the input.
  pub title: String,
  /// Suggested height in pixels.
  pub height: u32,
  /// Suggested width in pixels.
  pub width: u32,
}

impl PromptDescriptor {
  /// The modifier modal with the sheet's standard geometry.
  pub fn modifier(title: impl Into<String>) -> Self {
    Self {
      id: "landofeem-modifier-modal".to_string(),
      title: title.into(),
      height: 160,
      width: 250,
    }
  }
}

/// Trait for modal prompt providers.
#[async_trait]
pub trait ModifierPrompt: Send + Sync + 'static {
  /// Open the modal and wait for a number or a dismissal.
  async fn open(&self, descriptor: &PromptDescriptor) -> Option<i32>;
}
