//! Repeating entries and their typed field keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::scalar_to_string;

/// Name of the only repeating collection on the sheet.
pub const SKILLS: &str = "skills";

/// Serialized key of the entry id; never writable as a field.
pub const ID_FIELD: &str = "id";

/// Opaque, stable identifier of one entry.
///
/// Fresh ids are v4 UUIDs; ids read back from a snapshot are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the repeating collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Entry {
    /// A bare entry carrying only its id.
    pub fn new(id: EntryId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Copy of this entry with `field` replaced. The id field is left
    /// alone.
    #[must_use]
    pub fn with_field(&self, field: &str, value: &str) -> Self {
        let mut next = self.clone();
        if field != ID_FIELD {
            next.fields.insert(field.to_string(), value.to_string());
        }
        next
    }

    /// Read an entry from snapshot JSON.
    ///
    /// Anything that is not an object with a non-empty string or
    /// numeric `id` is rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id").and_then(scalar_to_string)?;
        if id.is_empty() {
            return None;
        }
        let fields = object
            .iter()
            .filter(|(k, _)| k.as_str() != ID_FIELD)
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect();
        Some(Self {
            id: EntryId(id),
            fields,
        })
    }
}

/// Structured address of one field inside one entry.
///
/// Replaces the flat `repeating_<collection>_<id>_<field>` naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingKey {
    pub collection: String,
    pub entry_id: EntryId,
    pub field: String,
}

impl RepeatingKey {
    pub fn skill(entry_id: EntryId, field: &str) -> Self {
        Self {
            collection: SKILLS.to_string(),
            entry_id,
            field: field.to_string(),
        }
    }

    /// Destructure a flat `repeating_<collection>_<id>_<field>` name.
    ///
    /// Assumes the id has no `_`, which holds for generated ids. Use
    /// [`RepeatingKey::resolve`] when imported ids may contain one.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("repeating_")?;
        let mut parts = rest.splitn(3, '_');
        let collection = parts.next().filter(|s| !s.is_empty())?;
        let entry_id = parts.next().filter(|s| !s.is_empty())?;
        let field = parts.next().filter(|s| !s.is_empty())?;
        Some(Self {
            collection: collection.to_string(),
            entry_id: EntryId::from(entry_id),
            field: field.to_string(),
        })
    }
}

impl RepeatingKey {
    /// Like [`RepeatingKey::parse`], but matches the id segment against
    /// `known` first so ids containing `_` are addressable. The longest
    /// matching id wins; with no match this falls back to `parse`.
    pub fn resolve<'a>(name: &str, known: impl IntoIterator<Item = &'a EntryId>) -> Option<Self> {
        let rest = name.strip_prefix("repeating_")?;
        let (collection, tail) = rest.split_once('_')?;
        if collection.is_empty() {
            return None;
        }
        let matched = known
            .into_iter()
            .filter_map(|id| {
                let field = tail.strip_prefix(id.as_str())?.strip_prefix('_')?;
                (!field.is_empty()).then_some((id, field))
            })
            .max_by_key(|(id, _)| id.as_str().len());
        match matched {
            Some((id, field)) => Some(Self {
                collection: collection.to_string(),
                entry_id: id.clone(),
                field: field.to_string(),
            }),
            None => Self::parse(name),
        }
    }
}

impl std::fmt::Display for RepeatingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "repeating_{}_{}_{}",
            self.collection, self.entry_id, self.field
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().contains('_'));
    }

    #[test]
    fn test_with_field_leaves_source_untouched() {
        let entry = Entry::new(EntryId::from("abc"));
        let next = entry.with_field("skillname", "Climb");
        assert_eq!(entry.field("skillname"), None);
        assert_eq!(next.field("skillname"), Some("Climb"));
    }

    #[test]
    fn test_entry_from_json() {
        let entry = Entry::from_json(&json!({"id": "r1", "skillname": "Sneak", "skilledit": "on"})).unwrap();
        assert_eq!(entry.id.as_str(), "r1");
        assert_eq!(entry.field("skillname"), Some("Sneak"));
        assert!(Entry::from_json(&json!({"skillname": "x"})).is_none());
        assert!(Entry::from_json(&json!({"id": ""})).is_none());
        assert!(Entry::from_json(&json!("r1")).is_none());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = Entry::new(EntryId::from("r1")).with_field("skillname", "Lore");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"id": "r1", "skillname": "Lore"}));
    }

    #[test]
    fn test_repeating_key_parse() {
        let key = RepeatingKey::parse("repeating_skills_1b2c-3d_skill_description").unwrap();
        assert_eq!(key.collection, "skills");
        assert_eq!(key.entry_id.as_str(), "1b2c-3d");
        assert_eq!(key.field, "skill_description");
        assert_eq!(key.to_string(), "repeating_skills_1b2c-3d_skill_description");
        assert!(RepeatingKey::parse("repeating_skills_only").is_none());
        assert!(RepeatingKey::parse("vim").is_none());
    }

    #[test]
    fn test_repeating_key_resolves_underscored_ids() {
        let known = [EntryId::from("row"), EntryId::from("row_1")];
        let key = RepeatingKey::resolve("repeating_skills_row_1_skillname", &known).unwrap();
        assert_eq!(key.entry_id.as_str(), "row_1");
        assert_eq!(key.field, "skillname");

        let key = RepeatingKey::resolve("repeating_skills_row_skill_description", &known).unwrap();
        assert_eq!(key.entry_id.as_str(), "row");
        assert_eq!(key.field, "skill_description");

        let key = RepeatingKey::resolve("repeating_skills_abc_skillname", &known).unwrap();
        assert_eq!(key.entry_id.as_str(), "abc");
        assert!(RepeatingKey::resolve("vim", &known).is_none());
    }

    #[test]
    fn test_with_field_ignores_id() {
        let entry = Entry::new(EntryId::from("a"));
        let next = entry.with_field(ID_FIELD, "b");
        assert_eq!(next, entry);
        let value = serde_json::to_value(&next).unwrap();
        assert_eq!(value, json!({"id": "a"}));
    }
}
