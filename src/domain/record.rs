//! The persisted record: a flat attribute map plus the ordered
//! repeating sequence under [`REPEATING_KEY`].
//!
//! The snapshot format is one JSON object. Scalars of any JSON type are
//! accepted on the way in and stored as strings; a missing or malformed
//! repeating key reads as an empty sequence.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::attribute::REPEATING_KEY;
use super::entry::Entry;
use super::error::SheetError;

/// Convert a JSON scalar to its string form. Arrays, objects and null
/// have no scalar form.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Local state of one character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    attrs: BTreeMap<String, String>,
    entries: Vec<Entry>,
}

/// A shallow, key-wise update to a [`Record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub attrs: BTreeMap<String, String>,
    pub entries: Option<Vec<Entry>>,
}

impl RecordPatch {
    pub fn attr(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert(key.into(), value.into());
        Self {
            attrs,
            entries: None,
        }
    }

    pub fn entries(entries: Vec<Entry>) -> Self {
        Self {
            attrs: BTreeMap::new(),
            entries: Some(entries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.entries.is_none()
    }
}

impl From<Record> for RecordPatch {
    fn from(record: Record) -> Self {
        Self {
            attrs: record.attrs,
            entries: Some(record.entries),
        }
    }
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    /// Overwrite every key present in `patch`; keep everything else.
    pub fn merge(&mut self, patch: RecordPatch) {
        self.attrs.extend(patch.attrs);
        if let Some(entries) = patch.entries {
            self.entries = entries;
        }
    }

    /// Build a record from snapshot JSON.
    ///
    /// # Errors
    /// `SheetError::ImportParse` when the top level is not an object.
    pub fn from_json(value: &Value) -> Result<Self, SheetError> {
        let object = value
            .as_object()
            .ok_or_else(|| SheetError::ImportParse("snapshot must be a JSON object".to_string()))?;

        let attrs = object
            .iter()
            .filter(|(k, _)| k.as_str() != REPEATING_KEY)
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect();

        let entries = object
            .get(REPEATING_KEY)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Entry::from_json).collect())
            .unwrap_or_default();

        Ok(Self { attrs, entries })
    }

    /// Parse snapshot text.
    ///
    /// # Errors
    /// `SheetError::ImportParse` on malformed JSON or a non-object top level.
    pub fn from_json_str(text: &str) -> Result<Self, SheetError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Serialise to the flat snapshot object.
    pub fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self
            .attrs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        object.insert(
            REPEATING_KEY.to_string(),
            Value::Array(
                self.entries
                    .iter()
                    .map(|e| serde_json::to_value(e).unwrap_or(Value::Null))
                    .collect(),
            ),
        );
        Value::Object(object)
    }
}

/// Download name for an exported snapshot:
/// `<name>_<M-D-YYYY>_<h-mm-ss>_<AM|PM>.json`, spaces as underscores.
pub fn export_file_name(character_name: &str, now: NaiveDateTime) -> String {
    let name = if character_name.is_empty() {
        "character"
    } else {
        character_name
    };
    format!(
        "{}_{}.json",
        name.replace(' ', "_"),
        now.format("%-m-%-d-%Y_%-I-%M-%S_%p")
    )
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::EntryId;
    use serde_json::json;

    #[test]
    fn test_merge_is_shallow() {
        let mut record = Record::default();
        record.set("vim", "+1");
        record.set("lore", "+2");
        record.merge(RecordPatch::attr("vim", "+3"));
        assert_eq!(record.get("vim"), Some("+3"));
        assert_eq!(record.get("lore"), Some("+2"));
    }

    #[test]
    fn test_merge_replaces_entries_only_when_present() {
        let mut record = Record::default();
        record.set_entries(vec![Entry::new(EntryId::from("a"))]);
        record.merge(RecordPatch::attr("xp", "3"));
        assert_eq!(record.entries().len(), 1);
        record.merge(RecordPatch::entries(Vec::new()));
        assert!(record.entries().is_empty());
    }

    #[test]
    fn test_from_json_tolerates_numbers_and_bad_sequence() {
        let record = Record::from_json(&json!({
            "courage": 12,
            "tired": true,
            "character_name": "Pip",
            "repeating_skills": "oops"
        }))
        .unwrap();
        assert_eq!(record.get("courage"), Some("12"));
        assert_eq!(record.get("tired"), Some("true"));
        assert!(record.entries().is_empty());
    }

    #[test]
    fn test_from_json_skips_malformed_entries() {
        let record = Record::from_json(&json!({
            "repeating_skills": [{"id": "a", "skillname": "Swim"}, 7, {"skillname": "no id"}]
        }))
        .unwrap();
        assert_eq!(record.entries().len(), 1);
        assert_eq!(record.entries()[0].field("skillname"), Some("Swim"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(Record::from_json(&json!([1, 2])), Err(SheetError::ImportParse(_))));
        assert!(matches!(Record::from_json_str("{"), Err(SheetError::ImportParse(_))));
    }

    #[test]
    fn test_export_file_name() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        assert_eq!(export_file_name("Pip the Bold", now), "Pip_the_Bold_3-7-2024_3-04-05_PM.json");
        assert_eq!(export_file_name("", now), "character_3-7-2024_3-04-05_PM.json");
    }

    #[test]
    fn test_to_json_includes_sequence() {
        let mut record = Record::default();
        record.set("vim", "+1");
        record.set_entries(vec![Entry::new(EntryId::from("a")).with_field("skillname", "Swim")]);
        let value = record.to_json();
        assert_eq!(value["vim"], "+1");
        assert_eq!(value["repeating_skills"][0]["id"], "a");
        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
