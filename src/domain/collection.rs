//! Ordered repeating collection engine.
//!
//! Keeps the authoritative entry sequence and the live row order side
//! by side. Every settled operation leaves both in the same order.
//! Only a drag in progress may let the live rows run ahead of the
//! sequence; `drop_drag` hands the live order back for `reorder`.

use tracing::debug;

use super::entry::{Entry, EntryId, ID_FIELD};

/// Pointer position (0.0 top .. 1.0 bottom of the hovered row) past
/// which the dragged row lands after the target.
pub const INSERT_AFTER_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct RepeatingCollection {
    /// Authoritative sequence, persisted as-is.
    entries: Vec<Entry>,
    /// Live row order as currently rendered.
    rows: Vec<EntryId>,
    /// Row being dragged, if any.
    dragging: Option<EntryId>,
}

impl RepeatingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn visual_order(&self) -> &[EntryId] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// True when no drag is in flight and rows mirror the sequence.
    pub fn is_settled(&self) -> bool {
        self.dragging.is_none()
            && self.rows.len() == self.entries.len()
            && self.rows.iter().zip(&self.entries).all(|(r, e)| *r == e.id)
    }

    /// Append a bare entry and its live row.
    pub fn add_entry(&mut self) -> EntryId {
        let id = EntryId::generate();
        self.entries.push(Entry::new(id.clone()));
        self.rows.push(id.clone());
        debug!(entry = %id, "Entry created");
        id
    }

    /// Replace one field of the entry `id`. Returns false for unknown
    /// ids and for the reserved id field.
    pub fn set_entry_field(&mut self, id: &EntryId, field: &str, value: &str) -> bool {
        if field == ID_FIELD {
            return false;
        }
        match self.entries.iter().position(|e| &e.id == id) {
            Some(index) => {
                self.entries[index] = self.entries[index].with_field(field, value);
                true
            }
            None => false,
        }
    }

    /// Remove the entry and release its row. Unknown ids are a no-op.
    pub fn delete_entry(&mut self, id: &EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        self.rows.retain(|r| r != id);
        if self.dragging.as_ref() == Some(id) {
            self.dragging = None;
        }
        self.entries.len() != before
    }

    /// Rebuild the sequence from a visual order.
    ///
    /// Ids with no entry are dropped, repeated ids keep their first
    /// position. Entries missing from `visual` are dropped as well,
    /// matching what was rendered.
    pub fn reorder(&mut self, visual: &[EntryId]) {
        let mut next: Vec<Entry> = Vec::with_capacity(visual.len());
        for id in visual {
            if next.iter().any(|e| &e.id == id) {
                continue;
            }
            if let Some(entry) = self.get(id) {
                next.push(entry.clone());
            }
        }
        self.entries = next;
        self.sync_rows();
        self.dragging = None;
    }

    /// Replace everything with `sequence`, as on load or import.
    ///
    /// Duplicate ids keep only their first occurrence.
    pub fn rebuild_from_sequence(&mut self, sequence: Vec<Entry>) {
        let mut entries: Vec<Entry> = Vec::with_capacity(sequence.len());
        for entry in sequence {
            if entries.iter().any(|e| e.id == entry.id) {
                continue;
            }
            entries.push(entry);
        }
        self.entries = entries;
        self.sync_rows();
        self.dragging = None;
    }

    pub fn clear(&mut self) {
        self.rebuild_from_sequence(Vec::new());
    }

    /// Start dragging row `id`.
    pub fn begin_drag(&mut self, id: &EntryId) -> bool {
        if !self.rows.contains(id) {
            return false;
        }
        self.dragging = Some(id.clone());
        true
    }

    /// Move the dragged row relative to the hovered `target`.
    ///
    /// `pointer_ratio` is the pointer's vertical position within the
    /// target row. Returns true when the live order changed.
    pub fn hover(&mut self, target: &EntryId, pointer_ratio: f64) -> bool {
        let Some(dragged) = self.dragging.clone() else {
            return false;
        };
        if &dragged == target {
            return false;
        }
        let (Some(from), Some(at)) = (
            self.rows.iter().position(|r| *r == dragged),
            self.rows.iter().position(|r| r == target),
        ) else {
            return false;
        };

        let after = pointer_ratio > INSERT_AFTER_RATIO;
        if after && self.rows.get(at + 1) == Some(&dragged) {
            return false;
        }
        if !after && at > 0 && self.rows.get(at - 1) == Some(&dragged) {
            return false;
        }

        let row = self.rows.remove(from);
        let target_index = if from < at { at - 1 } else { at };
        let insert_at = if after { target_index + 1 } else { target_index };
        self.rows.insert(insert_at, row);
        true
    }

    /// Finish the drag and return the live order to commit.
    pub fn drop_drag(&mut self) -> Option<Vec<EntryId>> {
        self.dragging.take().map(|_| self.rows.clone())
    }

    /// Abandon the drag and snap rows back to the sequence.
    pub fn cancel_drag(&mut self) {
        self.dragging = None;
        self.sync_rows();
    }

    fn sync_rows(&mut self) {
        self.rows = self.entries.iter().map(|e| e.id.clone()).collect();
    }
}
