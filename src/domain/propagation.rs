//! Derived-stat propagation.
//!
//! A fixed table fans each primary attribute out to four derived
//! attributes. A change of Δ on the primary moves every derived
//! attribute by the same Δ, each clamped on its own. Primaries also
//! carry bespoke side effects (resource pool, capacity, defense,
//! quest points). Only user writes propagate; the writes produced
//! here are applied as script writes and never feed back.

use super::attribute::{clamp_signed, format_signed, parse_int_prefix};
use super::store::{AttributeChange, AttributeStore, WriteOrigin};

/// Base inventory capacity before might and vitality.
pub const BASE_CAPACITY: i64 = 20;
/// Base courage before vim and class offset.
pub const BASE_COURAGE: i64 = 12;
/// Quest points granted on top of knowhow.
pub const QUEST_POINT_BONUS: i64 = 3;

/// One primary attribute and the four it drives.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryGroup {
    pub primary: &'static str,
    pub derived: [&'static str; 4],
}

pub const PRIMARY_GROUPS: [PrimaryGroup; 4] = [
    PrimaryGroup {
        primary: "vim",
        derived: ["charm", "inspire", "mettle", "perception"],
    },
    PrimaryGroup {
        primary: "vigor",
        derived: ["athletics", "intimidate", "might", "vitality"],
    },
    PrimaryGroup {
        primary: "knack",
        derived: ["nimbleness", "search", "sneak", "trickery"],
    },
    PrimaryGroup {
        primary: "knowhow",
        derived: ["lore", "realms", "tinker", "wilderness"],
    },
];

/// Class row: dread die and courage offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassArchetype {
    pub name: &'static str,
    pub dread: &'static str,
    pub courage_offset: i64,
}

pub const CLASS_TABLE: [ClassArchetype; 6] = [
    ClassArchetype { name: "bard", dread: "1d4", courage_offset: 0 },
    ClassArchetype { name: "dungeoneer", dread: "1d6", courage_offset: 1 },
    ClassArchetype { name: "gnome", dread: "1d8", courage_offset: 2 },
    ClassArchetype { name: "knight-errant", dread: "1d10", courage_offset: 3 },
    ClassArchetype { name: "loyal-chum", dread: "1d6", courage_offset: 1 },
    ClassArchetype { name: "rascal", dread: "1d8", courage_offset: 2 },
];

/// Look up a class by name.
pub fn archetype(name: &str) -> Option<&'static ClassArchetype> {
    CLASS_TABLE.iter().find(|c| c.name == name)
}

/// A write the propagator wants applied, in order.
pub type DerivedWrite = (&'static str, String);

/// Stateless reaction to attribute changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagator;

impl Propagator {
    pub fn new() -> Self {
        Self
    }

    /// Writes that follow from `change`, given the store after the
    /// change was applied. Empty for non-user origins and for keys
    /// that drive nothing.
    pub fn react(&self, change: &AttributeChange, store: &AttributeStore) -> Vec<DerivedWrite> {
        if change.origin != WriteOrigin::User {
            return Vec::new();
        }

        let clamp = store.clamp_enabled();
        let new_value = parse_int_prefix(&change.current).unwrap_or(0);
        let delta = new_value.saturating_sub(parse_int_prefix(&change.previous).unwrap_or(0));

        match change.key.as_str() {
            "vim" => {
                let mut writes = shift_group(store, &PRIMARY_GROUPS[0].derived, delta, clamp);
                writes.push(("courage_max", store.int("courage_max").saturating_add(delta).to_string()));
                writes.push(("courage", store.int("courage").saturating_add(delta).to_string()));
                writes
            }
            "vigor" => {
                let mut writes = shift_group(store, &PRIMARY_GROUPS[1].derived, delta, clamp);
                let might = shifted(store, "might", delta, clamp);
                let vitality = shifted(store, "vitality", delta, clamp);
                writes.push(("attack", format_signed(new_value)));
                writes.push((
                    "inventory_slots_max",
                    capacity(might, vitality).to_string(),
                ));
                writes
            }
            "knack" => {
                let mut writes = shift_group(store, &PRIMARY_GROUPS[2].derived, delta, clamp);
                writes.push(("defense", format_signed(new_value.saturating_neg())));
                writes
            }
            "knowhow" => {
                let mut writes = shift_group(store, &PRIMARY_GROUPS[3].derived, delta, clamp);
                writes.push(("quest_pts", new_value.saturating_add(QUEST_POINT_BONUS).to_string()));
                writes
            }
            "might" => vec![(
                "inventory_slots_max",
                capacity(new_value, store.int("vitality")).to_string(),
            )],
            "vitality" => vec![(
                "inventory_slots_max",
                capacity(new_value, store.int("might")).to_string(),
            )],
            "class" => class_change(&change.current, store),
            _ => Vec::new(),
        }
    }
}

fn shifted(store: &AttributeStore, key: &str, delta: i64, clamp: bool) -> i64 {
    clamp_signed(store.int(key).saturating_add(delta), clamp)
}

fn capacity(might: i64, vitality: i64) -> i64 {
    BASE_CAPACITY.saturating_add(might).saturating_add(vitality)
}

fn shift_group(
    store: &AttributeStore,
    derived: &[&'static str; 4],
    delta: i64,
    clamp: bool,
) -> Vec<DerivedWrite> {
    derived
        .iter()
        .map(|key| (*key, format_signed(shifted(store, key, delta, clamp))))
        .collect()
}

fn class_change(new_class: &str, store: &AttributeStore) -> Vec<DerivedWrite> {
    if store.value("hidden_class") == new_class {
        return Vec::new();
    }
    let Some(class) = archetype(new_class) else {
        return Vec::new();
    };

    let courage_max = BASE_COURAGE
        .saturating_add(store.int("vim"))
        .saturating_add(class.courage_offset);
    vec![
        ("dread", class.dread.to_string()),
        ("courage_max", courage_max.to_string()),
        ("courage", courage_max.to_string()),
        ("hidden_class", class.name.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(store: &mut AttributeStore, key: &str, raw: &str) -> Vec<DerivedWrite> {
        let change = store.write(key, raw, WriteOrigin::User).unwrap();
        let writes = Propagator::new().react(&change, store);
        for (k, v) in &writes {
            store.write(k, v, WriteOrigin::Script);
        }
        writes
    }

    fn unclamped() -> AttributeStore {
        let mut store = AttributeStore::new();
        store.write("clamp_modifiers", "false", WriteOrigin::Load);
        store
    }

    #[test]
    fn test_clamped_group_saturates() {
        let mut store = AttributeStore::new();
        assert!(store.clamp_enabled());
        // knowhow itself clamps to +3, so Δ is 3 and the group reaches +3
        apply(&mut store, "knowhow", "5");
        for key in ["lore", "realms", "tinker", "wilderness"] {
            assert_eq!(store.value(key), "+3", "{key}");
        }
    }

    #[test]
    fn test_unclamped_delta_five_saturates_under_clamp() {
        // primary moves by +5 while unbounded, derived are then clamped
        let mut store = unclamped();
        let change = store.write("vim", "5", WriteOrigin::User).unwrap();
        store.write("clamp_modifiers", "true", WriteOrigin::Load);
        for (k, v) in Propagator::new().react(&change, &store) {
            store.write(k, &v, WriteOrigin::Script);
        }
        for key in ["charm", "inspire", "mettle", "perception"] {
            assert_eq!(store.value(key), "+3", "{key}");
        }
    }

    #[test]
    fn test_vim_shifts_courage() {
        let mut store = unclamped();
        store.write("courage", "10", WriteOrigin::Load);
        store.write("courage_max", "12", WriteOrigin::Load);
        apply(&mut store, "vim", "2");
        assert_eq!(store.value("courage"), "12");
        assert_eq!(store.value("courage_max"), "14");
        assert_eq!(store.value("charm"), "+2");
    }

    #[test]
    fn test_vigor_sets_attack_and_capacity() {
        let mut store = unclamped();
        store.write("might", "1", WriteOrigin::Load);
        apply(&mut store, "vigor", "2");
        assert_eq!(store.value("might"), "+3");
        assert_eq!(store.value("vitality"), "+2");
        assert_eq!(store.value("attack"), "+2");
        assert_eq!(store.value("inventory_slots_max"), "25");
    }

    #[test]
    fn test_knack_negates_into_defense() {
        let mut store = unclamped();
        apply(&mut store, "knack", "2");
        assert_eq!(store.value("defense"), "-2");
        apply(&mut store, "knack", "-1");
        assert_eq!(store.value("defense"), "+1");
        assert_eq!(store.value("sneak"), "-1");
    }

    #[test]
    fn test_knowhow_sets_quest_points() {
        let mut store = unclamped();
        apply(&mut store, "knowhow", "1");
        assert_eq!(store.value("quest_pts"), "4");
    }

    #[test]
    fn test_capacity_inputs() {
        let mut store = unclamped();
        store.write("vitality", "2", WriteOrigin::Load);
        apply(&mut store, "might", "3");
        assert_eq!(store.value("inventory_slots_max"), "25");
        apply(&mut store, "vitality", "-1");
        assert_eq!(store.value("inventory_slots_max"), "22");
    }

    #[test]
    fn test_unclamped_extremes_saturate() {
        let mut store = unclamped();
        apply(&mut store, "vim", &i64::MAX.to_string());
        assert_eq!(store.value("courage_max"), i64::MAX.to_string());
        assert_eq!(store.value("charm"), format!("+{}", i64::MAX));

        apply(&mut store, "knack", &i64::MIN.to_string());
        assert_eq!(store.value("defense"), format!("+{}", i64::MAX));

        apply(&mut store, "knowhow", &i64::MAX.to_string());
        assert_eq!(store.value("quest_pts"), i64::MAX.to_string());

        apply(&mut store, "vigor", &i64::MAX.to_string());
        assert_eq!(store.value("inventory_slots_max"), i64::MAX.to_string());

        apply(&mut store, "class", "gnome");
        assert_eq!(store.value("courage_max"), i64::MAX.to_string());
    }

    #[test]
    fn test_derived_writes_do_not_cascade() {
        let mut store = unclamped();
        let change = store.write("might", "2", WriteOrigin::Script).unwrap();
        assert!(Propagator::new().react(&change, &store).is_empty());
    }

    #[test]
    fn test_class_change_and_guard() {
        let mut store = unclamped();
        store.write("vim", "1", WriteOrigin::Load);
        let writes = apply(&mut store, "class", "knight-errant");
        assert_eq!(writes.len(), 4);
        assert_eq!(store.value("dread"), "1d10");
        assert_eq!(store.value("courage_max"), "16");
        assert_eq!(store.value("courage"), "16");
        assert_eq!(store.value("hidden_class"), "knight-errant");

        assert!(apply(&mut store, "class", "knight-errant").is_empty());
        assert!(apply(&mut store, "class", "wizard").is_empty());
    }
}
