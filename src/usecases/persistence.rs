//! Persistence Coordinator - Debounced Slot Storage
//!
//! Owns the in-memory record as last handed to storage and is the only
//! component that talks to the `KeyValueStorage` port. Saves are
//! merged into the record immediately and written after a quiet
//! period; a newer save cancels the pending one so a burst of edits
//! costs one write.
//!
//! The pending write is a spawned task racing its sleep against a
//! oneshot cancel. Once the sleep wins the write runs to completion;
//! `flush` waits for it before writing anything else so two writes
//! to the same key never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::record::{Record, RecordPatch};
use crate::domain::store::WriteOrigin;
use crate::ports::storage::{KeyValueStorage, StorageKeys};

/// Slot used when nothing has been recorded yet.
pub const DEFAULT_SLOT: &str = "1";

/// A scheduled write that has not fired yet.
struct PendingWrite {
  /// Dropping or firing this cancels the write if it is still sleeping.
  cancel: oneshot::Sender<()>,
  /// Resolves to true when the write actually ran.
  handle: JoinHandle<bool>,
}

/// Debounced, slot-aware persistence of the sheet record.
pub struct PersistenceCoordinator<S: KeyValueStorage> {
  /// Storage port.
  storage: Arc<S>,
  /// Key builder for the current app and player.
  keys: StorageKeys,
  /// Local state: everything saved so far, merged key-wise.
  record: Record,
  /// Slot every write currently targets.
  slot: String,
  /// Writes are suppressed until the sheet finished its first load.
  ready: bool,
  /// Quiet period before a pending write fires.
  debounce: Duration,
  /// At most one scheduled write.
  pending: Option<PendingWrite>,
}

impl<S: KeyValueStorage> PersistenceCoordinator<S> {
  /// Create a coordinator. It starts not ready; call `mark_ready`
  /// once the initial load has been applied.
  pub fn new(storage: Arc<S>, keys: StorageKeys, debounce: Duration) -> Self {
    Self {
      storage,
      keys,
      record: Record::default(),
      slot: DEFAULT_SLOT.to_string(),
      ready: false,
      debounce,
      pending: None,
    }
  }

  pub fn mark_ready(&mut self) {
    self.ready = true;
  }

  pub fn is_ready(&self) -> bool {
    self.ready
  }

  pub fn record(&self) -> &Record {
    &self.record
  }

  pub fn active_slot(&self) -> &str {
    &self.slot
  }

  pub fn keys(&self) -> &StorageKeys {
    &self.keys
  }

  /// True while a debounced write is scheduled.
  pub fn has_pending(&self) -> bool {
    self
      .pending
      .as_ref()
      .is_some_and(|p| !p.handle.is_finished())
  }

  /// Merge `patch` into the record and (re)start the debounce timer.
  ///
  /// Suppressed entirely, record untouched, while not ready or for
  /// `Load` writes. Returns whether a write was scheduled.
  pub fn save(&mut self, patch: RecordPatch, origin: WriteOrigin) -> bool {
    if !self.ready || origin == WriteOrigin::Load {
      debug!(ready = self.ready, ?origin, "Save suppressed");
      return false;
    }
    if patch.is_empty() {
      return false;
    }

    self.record.merge(patch);
    self.schedule();
    true
  }

  /// Replace the pending write with one for the current record.
  fn schedule(&mut self) {
    if let Some(previous) = self.pending.take() {
      // Dropping the sender wakes the sleeping task's cancel branch.
      drop(previous.cancel);
    }

    let (cancel, cancelled) = oneshot::channel::<()>();
    let storage = Arc::clone(&self.storage);
    let slot_key = self.keys.slot(&self.slot);
    let pointer_key = self.keys.last_slot();
    let slot = self.slot.clone();
    let blob = self.record.to_json().to_string();
    let delay = self.debounce;

    let handle = tokio::spawn(async move {
      tokio::select! {
        () = tokio::time::sleep(delay) => {
          write_slot(storage.as_ref(), &slot_key, &pointer_key, &slot, &blob).await;
          true
        }
        _ = cancelled => false,
      }
    });

    self.pending = Some(PendingWrite { cancel, handle });
  }

  /// Cancel the pending write if it is still waiting, or wait for it
  /// to finish if it already started. Returns true when the record
  /// still needs writing.
  async fn cancel_pending(&mut self) -> bool {
    let Some(PendingWrite { cancel, handle }) = self.pending.take() else {
      return false;
    };
    drop(cancel);
    match handle.await {
      Ok(wrote) => !wrote,
      Err(e) => {
        warn!(error = %e, "Pending write task failed");
        true
      }
    }
  }

  /// Write any pending change right now.
  #[instrument(skip(self), fields(slot = %self.slot))]
  pub async fn flush(&mut self) {
    if self.cancel_pending().await {
      self.write_current().await;
    }
  }

  async fn write_current(&self) {
    let blob = self.record.to_json().to_string();
    write_slot(
      self.storage.as_ref(),
      &self.keys.slot(&self.slot),
      &self.keys.last_slot(),
      &self.slot,
      &blob,
    )
    .await;
  }

  /// Slot recorded as last active, or the default slot.
  pub async fn last_slot(&self) -> String {
    match self.storage.get(&self.keys.last_slot()).await {
      Ok(Some(slot)) if !slot.trim().is_empty() => slot.trim().to_string(),
      Ok(_) => DEFAULT_SLOT.to_string(),
      Err(e) => {
        warn!(error = %e, "Failed to read last save slot, using default");
        DEFAULT_SLOT.to_string()
      }
    }
  }

  /// Reset to `defaults`, then merge whatever `slot` holds over them.
  ///
  /// The returned record is what the sheet should apply. Read or
  /// parse failures leave the defaults in place. `save_slot` always
  /// names the loaded slot, even when storage was empty.
  ///
  /// Once ready, loading another slot is a full [`switch_slot`], and
  /// reloading the active slot flushes the pending write first, so
  /// no write queued for the old slot can land afterwards.
  ///
  /// [`switch_slot`]: Self::switch_slot
  #[instrument(skip(self, defaults))]
  pub async fn load(&mut self, slot: &str, defaults: Record) -> Record {
    if self.ready && slot != self.slot {
      return self.switch_slot(slot, defaults).await;
    }
    self.flush().await;
    self.read_slot(slot, defaults).await
  }

  async fn read_slot(&mut self, slot: &str, defaults: Record) -> Record {
    self.slot = slot.to_string();
    self.record = defaults;

    let key = self.keys.slot(slot);
    match self.storage.get(&key).await {
      Ok(Some(blob)) => match Record::from_json_str(&blob) {
        Ok(stored) => {
          self.record.merge(RecordPatch::from(stored));
          info!(key = %key, entries = self.record.entries().len(), "Slot loaded");
        }
        Err(e) => warn!(key = %key, error = %e, "Stored slot is malformed, using defaults"),
      },
      Ok(None) => info!(key = %key, "Slot empty, using defaults"),
      Err(e) => error!(key = %key, error = %e, "Failed to read slot, using defaults"),
    }

    self.record.set("save_slot", slot);
    self.record.clone()
  }

  /// Flush the current record to the old slot, point storage at
  /// `new_slot` and load it.
  ///
  /// The pending timer is cancelled before the flush, so nothing
  /// scheduled for the old slot can land after the switch.
  #[instrument(skip(self, defaults), fields(from = %self.slot))]
  pub async fn switch_slot(&mut self, new_slot: &str, defaults: Record) -> Record {
    self.cancel_pending().await;

    let old_key = self.keys.slot(&self.slot);
    let blob = self.record.to_json().to_string();
    if let Err(e) = self.storage.set(&old_key, &blob).await {
      error!(key = %old_key, error = %e, "Failed to flush old slot before switch");
    }
    if let Err(e) = self.storage.set(&self.keys.last_slot(), new_slot).await {
      error!(error = %e, "Failed to record new save slot");
    }

    info!(to = new_slot, "Switching save slot");
    self.read_slot(new_slot, defaults).await
  }

  /// Replace the whole record and schedule one write of it.
  ///
  /// Used after an import, once the bound fields have been re-read.
  pub fn replace(&mut self, record: Record, origin: WriteOrigin) -> bool {
    if !self.ready || origin == WriteOrigin::Load {
      debug!(ready = self.ready, ?origin, "Replace suppressed");
      return false;
    }
    self.record = record;
    self.schedule();
    true
  }

  /// Flush, then serialise the full record.
  pub async fn export(&mut self) -> String {
    self.flush().await;
    self.record.to_json().to_string()
  }
}

/// Write one slot blob and the last-slot pointer. Failures are logged
/// and swallowed; the in-memory record stays authoritative.
async fn write_slot<S: KeyValueStorage + ?Sized>(
  storage: &S,
  slot_key: &str,
  pointer_key: &str,
  slot: &str,
  blob: &str,
) {
  if let Err(e) = storage.set(slot_key, blob).await {
    error!(key = slot_key, error = %e, "Failed to save slot");
    return;
  }
  if let Err(e) = storage.set(pointer_key, slot).await {
    error!(key = pointer_key, error = %e, "Failed to save last slot pointer");
    return;
  }
  debug!(key = slot_key, bytes = blob.len(), "Slot saved");
}
