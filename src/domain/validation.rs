//! Post-load validation and default filling.

use super::attribute::{self, SIGNED, UNSIGNED, clamp_signed, format_signed};
use super::store::{AttributeStore, WriteOrigin};

/// Data format version stamped on every validated sheet.
pub const SHEET_VERSION: &str = "1.0.0";

/// Dread die assumed when none is recorded.
pub const DEFAULT_DREAD: &str = "1d4";

/// Default for an unset counter.
pub fn unsigned_default(key: &str) -> i64 {
    match key {
        "inventory_slots_max" => 20,
        "courage" | "courage_max" => 12,
        "quest_pts" => 3,
        _ => 0,
    }
}

/// Bring every numeric field into canonical form and fill gaps.
///
/// Writes as `Load` so nothing here is persisted or propagated.
pub fn validate(store: &mut AttributeStore) {
    let clamp = store.clamp_enabled();

    for key in SIGNED {
        let value = attribute::parse_int_prefix(store.value(key)).unwrap_or(0);
        let formatted = format_signed(clamp_signed(value, clamp));
        store.write(key, &formatted, WriteOrigin::Load);
    }

    for key in UNSIGNED {
        if store.value(key).is_empty() {
            store.write(key, &unsigned_default(key).to_string(), WriteOrigin::Load);
        }
    }

    if store.value("dread").is_empty() {
        store.write("dread", DEFAULT_DREAD, WriteOrigin::Load);
    }

    store.write("version", SHEET_VERSION, WriteOrigin::Load);
}
