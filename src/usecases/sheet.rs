//! Character Sheet - Attribute Change Dispatch and Sheet Lifecycle
//!
//! The single entry point for every change to the sheet. Each write
//! flows through `change_attribute`, which applies it to the store,
//! lets the propagator react, and only then hands the combined result
//! to persistence. The `WriteOrigin` travels with the write so derived
//! and loaded values never echo back into propagation or storage.
//!
//! Also drives the repeating collection, slot switching, and
//! snapshot export/import.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};

use crate::domain::attribute::{SAVE_SLOTS, format_bool, parse_bool};
use crate::domain::collection::RepeatingCollection;
use crate::domain::entry::{EntryId, RepeatingKey, SKILLS};
use crate::domain::error::SheetError;
use crate::domain::propagation::Propagator;
use crate::domain::record::{self, Record, RecordPatch};
use crate::domain::store::{AttributeChange, AttributeStore, WriteOrigin};
use crate::domain::validation;
use crate::ports::notifier::Notifier;
use crate::ports::storage::KeyValueStorage;
use crate::usecases::persistence::PersistenceCoordinator;

/// Title of the notification shown when an import is rejected.
pub const IMPORT_FAILED_TITLE: &str = "Import failed";

/// Message shown when an import is rejected.
pub const IMPORT_FAILED_MESSAGE: &str = "Error importing file. Please check the file and try again.";

/// Title used when a shared entry has no name.
pub const UNKNOWN_SKILL: &str = "UNKNOWN SKILL";

/// Entry fields stored as checkbox values.
const ENTRY_CHECKBOX_FIELDS: &[&str] = &["skilledit"];

/// One character sheet bound to a storage backend.
pub struct CharacterSheet<S: KeyValueStorage, N: Notifier> {
  /// Bound field values.
  store: AttributeStore,
  /// Ordered skills.
  collection: RepeatingCollection,
  /// Derived-stat rules.
  propagator: Propagator,
  /// Only path to storage.
  persistence: PersistenceCoordinator<S>,
  /// Notification sink for shared entries and import failures.
  notifier: Arc<N>,
  /// How long shared-entry notifications stay up.
  share_duration: Duration,
}

impl<S: KeyValueStorage, N: Notifier> CharacterSheet<S, N> {
  pub fn new(
    persistence: PersistenceCoordinator<S>,
    notifier: Arc<N>,
    share_duration: Duration,
  ) -> Self {
    Self {
      store: AttributeStore::new(),
      collection: RepeatingCollection::new(),
      propagator: Propagator::new(),
      persistence,
      notifier,
      share_duration,
    }
  }

  pub fn store(&self) -> &AttributeStore {
    &self.store
  }

  pub fn collection(&self) -> &RepeatingCollection {
    &self.collection
  }

  pub fn persistence(&self) -> &PersistenceCoordinator<S> {
    &self.persistence
  }

  pub fn active_slot(&self) -> &str {
    self.persistence.active_slot()
  }

  /// Current values of `keys`; unknown keys read as `""`.
  pub fn get(&self, keys: &[&str]) -> BTreeMap<String, String> {
    self.store.get(keys)
  }

  // ── Lifecycle ──

  /// Load the last active slot and start accepting saves.
  #[instrument(skip(self))]
  pub async fn open(&mut self) {
    let slot = self.persistence.last_slot().await;
    self.load(&slot).await;
    self.persistence.mark_ready();
    info!(slot = %slot, "Sheet ready");
  }

  /// Replace everything with the contents of `slot`.
  pub async fn load(&mut self, slot: &str) {
    let defaults = Self::defaults();
    let record = self.persistence.load(slot, defaults).await;
    self.apply_record(&record);
  }

  /// Flush to the current slot, then load `slot`.
  ///
  /// # Errors
  /// `InvalidArgument` when `slot` is not one of the sheet's slots.
  #[instrument(skip(self))]
  pub async fn switch_slot(&mut self, slot: &str) -> Result<(), SheetError> {
    if !SAVE_SLOTS.contains(&slot) {
      return Err(SheetError::InvalidArgument(format!("unknown save slot '{slot}'")));
    }
    let defaults = Self::defaults();
    let record = self.persistence.switch_slot(slot, defaults).await;
    self.apply_record(&record);
    Ok(())
  }

  /// Write any pending change now.
  pub async fn flush(&mut self) {
    self.persistence.flush().await;
  }

  /// Restore `keys` to their defaults and clear the entries.
  /// Nothing is persisted.
  pub fn reset(&mut self, keys: &[&str]) {
    self.store.reset(keys);
    self.collection.clear();
  }

  /// Record built from catalog defaults only.
  fn defaults() -> Record {
    let mut record = Record::default();
    for (key, value) in AttributeStore::new().values() {
      record.set(key.clone(), value.clone());
    }
    record
  }

  /// Push a loaded or imported record into the bound fields, then
  /// validate. Every write is a `Load`, so nothing propagates or saves.
  fn apply_record(&mut self, record: &Record) {
    self.store.reset_all();
    self.collection.rebuild_from_sequence(record.entries().to_vec());
    for (key, value) in record.attrs() {
      self.store.write(key, value, WriteOrigin::Load);
    }
    validation::validate(&mut self.store);
    debug!(
      attrs = record.attrs().len(),
      entries = self.collection.len(),
      "Record applied"
    );
  }

  // ── Attribute changes ──

  /// Apply several writes in order.
  pub async fn set_attrs(
    &mut self,
    values: &[(&str, &str)],
    origin: WriteOrigin,
  ) -> Result<Vec<AttributeChange>, SheetError> {
    let mut changes = Vec::with_capacity(values.len());
    for (key, value) in values {
      if let Some(change) = self.change_attribute(key, value, origin).await? {
        changes.push(change);
      }
    }
    Ok(changes)
  }

  /// Route one write: entry fields go to the collection, `save_slot`
  /// switches slots, everything else goes to the store, then the
  /// propagator, then persistence.
  ///
  /// # Errors
  /// `InvalidArgument` for an unknown save slot.
  #[instrument(skip(self, raw), level = "debug")]
  pub async fn change_attribute(
    &mut self,
    key: &str,
    raw: &str,
    origin: WriteOrigin,
  ) -> Result<Option<AttributeChange>, SheetError> {
    let known = self.collection.entries().iter().map(|e| &e.id);
    if let Some(entry_key) = RepeatingKey::resolve(key, known) {
      if entry_key.collection == SKILLS {
        self.write_entry_field(&entry_key.entry_id, &entry_key.field, raw, origin);
      } else {
        debug!(key, "Unknown repeating collection, ignoring write");
      }
      return Ok(None);
    }

    if key == "save_slot" && origin == WriteOrigin::User {
      if raw != self.persistence.active_slot() {
        self.switch_slot(raw).await?;
      }
      return Ok(None);
    }

    let Some(change) = self.store.write(key, raw, origin) else {
      return Ok(None);
    };

    let derived = self.propagator.react(&change, &self.store);
    let mut patch = RecordPatch::attr(change.key.clone(), change.current.clone());
    for (derived_key, value) in derived {
      if let Some(applied) = self.store.write(derived_key, &value, WriteOrigin::Script) {
        patch.attrs.insert(applied.key, applied.current);
      }
    }

    self.persistence.save(patch, origin);
    Ok(Some(change))
  }

  /// Switch the visible tab.
  pub async fn select_tab(&mut self, tab: &str) -> Result<Option<AttributeChange>, SheetError> {
    self.change_attribute("sheetTab", tab, WriteOrigin::User).await
  }

  // ── Repeating collection ──

  fn save_entries(&mut self, origin: WriteOrigin) {
    let entries = self.collection.entries().to_vec();
    self.persistence.save(RecordPatch::entries(entries), origin);
  }

  fn write_entry_field(&mut self, id: &EntryId, field: &str, raw: &str, origin: WriteOrigin) -> bool {
    let value = if ENTRY_CHECKBOX_FIELDS.contains(&field) {
      if parse_bool(raw) { "on" } else { "0" }
    } else {
      raw
    };
    if !self.collection.set_entry_field(id, field, value) {
      debug!(entry = %id, field, "Entry field write ignored");
      return false;
    }
    self.save_entries(origin);
    true
  }

  /// Append a bare entry and persist the sequence.
  pub fn add_entry(&mut self) -> EntryId {
    let id = self.collection.add_entry();
    self.save_entries(WriteOrigin::User);
    id
  }

  /// Set one field of entry `id`. Unknown ids are ignored.
  pub fn set_entry_field(&mut self, id: &EntryId, field: &str, value: &str) -> bool {
    self.write_entry_field(id, field, value, WriteOrigin::User)
  }

  /// Remove entry `id`. Unknown ids are a no-op.
  pub fn delete_entry(&mut self, id: &EntryId) -> bool {
    if !self.collection.delete_entry(id) {
      return false;
    }
    self.save_entries(WriteOrigin::User);
    true
  }

  /// Make `visual` the authoritative order.
  pub fn reorder(&mut self, visual: &[EntryId]) {
    self.collection.reorder(visual);
    self.save_entries(WriteOrigin::User);
  }

  pub fn begin_drag(&mut self, id: &EntryId) -> bool {
    self.collection.begin_drag(id)
  }

  pub fn hover(&mut self, target: &EntryId, pointer_ratio: f64) -> bool {
    self.collection.hover(target, pointer_ratio)
  }

  /// Finish the drag and commit the live order.
  pub fn drop_drag(&mut self) -> bool {
    match self.collection.drop_drag() {
      Some(order) => {
        self.reorder(&order);
        true
      }
      None => false,
    }
  }

  pub fn cancel_drag(&mut self) {
    self.collection.cancel_drag();
  }

  /// Publish entry `id` as a notification. Unknown ids are a no-op.
  pub fn share_entry(&self, id: &EntryId) -> bool {
    let Some(entry) = self.collection.get(id) else {
      return false;
    };
    let title = match entry.field("skillname") {
      Some(name) if !name.is_empty() => name.to_uppercase(),
      _ => UNKNOWN_SKILL.to_string(),
    };
    let message = entry
      .field("skilldescription")
      .unwrap_or_default()
      .replace('\n', "<br>");
    self.notifier.publish(&title, &message, self.share_duration);
    true
  }

  // ── Snapshots ──

  /// Flush, then return the full record as JSON text.
  pub async fn export_snapshot(&mut self) -> String {
    self.persistence.export().await
  }

  /// Suggested download name for an export taken at `now`.
  pub fn export_file_name(&self, now: NaiveDateTime) -> String {
    record::export_file_name(self.store.value("character_name"), now)
  }

  /// Replace the sheet with `text`, keeping the active slot.
  ///
  /// # Errors
  /// `ImportParse` when `text` is not a JSON object. A failure
  /// notification is published and nothing changes.
  #[instrument(skip(self, text), fields(bytes = text.len()))]
  pub async fn import_snapshot(&mut self, text: &str) -> Result<(), SheetError> {
    let imported = match Record::from_json_str(text) {
      Ok(record) => record,
      Err(e) => {
        warn!(error = %e, "Import rejected");
        self
          .notifier
          .publish(IMPORT_FAILED_TITLE, IMPORT_FAILED_MESSAGE, self.share_duration);
        return Err(e);
      }
    };

    let slot = self.persistence.active_slot().to_string();
    let mut merged = Self::defaults();
    merged.merge(RecordPatch::from(imported));
    merged.set("save_slot", slot.clone());

    self.apply_record(&merged);

    // re-read what validation settled on
    let mut settled = merged;
    for (key, value) in self.store.values() {
      settled.set(key.clone(), value.clone());
    }
    settled.set_entries(self.collection.entries().to_vec());
    self.persistence.replace(settled, WriteOrigin::Script);

    info!(slot = %slot, entries = self.collection.len(), "Import applied");
    Ok(())
  }

  /// Toggle a boolean attribute as the user would.
  pub async fn toggle(&mut self, key: &str) -> Result<Option<AttributeChange>, SheetError> {
    let next = format_bool(!parse_bool(self.store.value(key)));
    self.change_attribute(key, next, WriteOrigin::User).await
  }
}
