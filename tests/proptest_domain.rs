//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that domain components maintain their
//! invariants across random inputs.

use proptest::prelude::*;

use eem_sheet::domain::attribute::{clamp_signed, format_signed, parse_int_prefix};
use eem_sheet::domain::collection::RepeatingCollection;
use eem_sheet::domain::dice::{roll_dice, roll_die};
use eem_sheet::domain::entry::EntryId;
use eem_sheet::domain::propagation::{PRIMARY_GROUPS, Propagator};
use eem_sheet::domain::store::{AttributeStore, WriteOrigin};

// ── Dice Engine Properties ──────────────────────────────────

proptest! {
    /// Every face lands in [1, sides].
    #[test]
    fn die_always_in_range(sides in 1i32..1000) {
        let face = roll_die(sides).unwrap();
        prop_assert!((1..=sides).contains(&face), "d{sides} rolled {face}");
    }

    /// Non-positive side counts are rejected, never rolled.
    #[test]
    fn non_positive_sides_rejected(sides in -1000i32..=0) {
        prop_assert!(roll_die(sides).is_err());
    }

    /// `total` is the first die, `sum` every die, and the advantage
    /// bracket holds the extremes.
    #[test]
    fn roll_aggregates_are_consistent(
        sides in 1i32..100,
        count in 1usize..6,
        modifier in -10i32..10,
    ) {
        let r = roll_dice(sides, count, modifier).unwrap();
        prop_assert_eq!(r.rolls.len(), count);
        prop_assert_eq!(r.total, r.rolls[0] + modifier);
        prop_assert_eq!(r.sum, r.rolls.iter().sum::<i32>() + modifier);
        prop_assert_eq!(r.advantage_roll, *r.rolls.iter().max().unwrap());
        prop_assert_eq!(r.disadvantage_roll, *r.rolls.iter().min().unwrap());
        prop_assert!(r.advantage_roll >= r.disadvantage_roll);
        prop_assert_eq!(r.advantage_total, r.advantage_roll + modifier);
        prop_assert_eq!(r.disadvantage_total, r.disadvantage_roll + modifier);
    }
}

// ── Attribute Store Properties ──────────────────────────────

proptest! {
    /// Signed formatting always carries an explicit sign and parses back.
    #[test]
    fn signed_format_round_trips(value in -1_000_000i64..1_000_000) {
        let text = format_signed(value);
        prop_assert!(text.starts_with('+') || text.starts_with('-'));
        prop_assert_eq!(parse_int_prefix(&text), Some(value));
    }

    /// Clamping saturates at ±3 and never wraps.
    #[test]
    fn clamp_saturates(value in any::<i32>()) {
        let clamped = clamp_signed(i64::from(value), true);
        prop_assert!((-3..=3).contains(&clamped));
        if (-3..=3).contains(&value) {
            prop_assert_eq!(clamped, i64::from(value));
        }
    }

    /// With clamping on, user writes to signed attributes stay in range.
    #[test]
    fn user_signed_writes_respect_clamp(raw in "[-+]?[0-9]{1,6}|[a-z]{0,4}") {
        let mut store = AttributeStore::new();
        store.write("lore", &raw, WriteOrigin::User);
        let value = store.int("lore");
        prop_assert!((-3..=3).contains(&value));
    }

    /// Every derived attribute of a primary ends within the clamp
    /// range, whatever the change.
    #[test]
    fn propagation_keeps_derived_clamped(group in 0usize..4, from in -3i64..=3, to in -3i64..=3) {
        let group = PRIMARY_GROUPS[group];
        let mut store = AttributeStore::new();
        store.write(group.primary, &from.to_string(), WriteOrigin::User);
        let change = store.write(group.primary, &to.to_string(), WriteOrigin::User).unwrap();
        for (key, value) in Propagator::new().react(&change, &store) {
            store.write(key, &value, WriteOrigin::Script);
        }
        for key in group.derived {
            prop_assert!((-3..=3).contains(&store.int(key)), "{key} = {}", store.value(key));
        }
    }
}

// ── Repeating Collection Properties ─────────────────────────

proptest! {
    /// Any permutation of the visual order becomes the sequence, and
    /// the collection settles with no duplicate ids.
    #[test]
    fn reorder_follows_permutation(
        (len, order) in (1usize..8).prop_flat_map(|n| (Just(n), Just((0..n).collect::<Vec<_>>()).prop_shuffle()))
    ) {
        let mut collection = RepeatingCollection::new();
        let ids: Vec<EntryId> = (0..len).map(|_| collection.add_entry()).collect();
        let visual: Vec<EntryId> = order.iter().map(|i| ids[*i].clone()).collect();

        collection.reorder(&visual);
        let result: Vec<EntryId> = collection.entries().iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(result, visual);
        prop_assert!(collection.is_settled());
    }

    /// Ids missing from the visual order are dropped; unknown ids are ignored.
    #[test]
    fn reorder_drops_missing_ids(len in 2usize..8, keep in 1usize..8) {
        let mut collection = RepeatingCollection::new();
        let ids: Vec<EntryId> = (0..len).map(|_| collection.add_entry()).collect();
        let keep = keep.min(len);
        let mut visual: Vec<EntryId> = ids[..keep].to_vec();
        visual.push(EntryId::from("ghost"));

        collection.reorder(&visual);
        prop_assert_eq!(collection.len(), keep);
        prop_assert!(collection.get(&EntryId::from("ghost")).is_none());
        prop_assert!(collection.is_settled());
    }

    /// Hovering never loses or duplicates a row.
    #[test]
    fn drag_preserves_rows(len in 2usize..8, from in 0usize..8, to in 0usize..8, ratio in 0.0f64..1.0) {
        let mut collection = RepeatingCollection::new();
        let ids: Vec<EntryId> = (0..len).map(|_| collection.add_entry()).collect();
        collection.begin_drag(&ids[from % len]);
        collection.hover(&ids[to % len], ratio);
        let order = collection.drop_drag().unwrap();

        let mut sorted = order.clone();
        sorted.sort();
        let mut expected = ids.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);

        collection.reorder(&order);
        prop_assert!(collection.is_settled());
    }
}
