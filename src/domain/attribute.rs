//! Attribute catalog and per-kind value rules.
//!
//! Every sheet attribute is declared exactly once here with its kind
//! and default. Values always round-trip as strings; signed numbers
//! carry an explicit sign (`"+0"`, `"-2"`).

/// Lowest value a signed attribute may hold while clamping is enabled.
pub const CLAMP_MIN: i64 = -3;
/// Highest value a signed attribute may hold while clamping is enabled.
pub const CLAMP_MAX: i64 = 3;

/// Reserved record key holding the repeating skill entries.
pub const REPEATING_KEY: &str = "repeating_skills";

/// Declared kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Integer displayed with an explicit sign, subject to the clamp policy.
    Signed,
    /// Plain integer counter.
    Unsigned,
    /// Free text.
    Text,
    /// Checkbox, canonicalised to `"true"` / `"false"`.
    Boolean,
    /// Exclusive choice among a fixed option list (radio group / select).
    SingleChoice(&'static [&'static str]),
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDef {
    pub key: &'static str,
    pub kind: AttributeKind,
    pub default: &'static str,
}

pub const SIGNED: &[&str] = &[
    "attack",
    "defense",
    "vim",
    "charm",
    "inspire",
    "mettle",
    "perception",
    "vigor",
    "athletics",
    "intimidate",
    "might",
    "vitality",
    "knack",
    "nimbleness",
    "search",
    "sneak",
    "trickery",
    "knowhow",
    "lore",
    "realms",
    "tinker",
    "wilderness",
    "treasure_hunting",
];

pub const UNSIGNED: &[&str] = &[
    "courage",
    "courage_max",
    "quest_pts",
    "block",
    "inventory_slots",
    "inventory_slots_max",
    "material_number",
    "coins_copper",
    "coins_silver",
    "coins_gold",
    "coins_ancient",
    "rations_d6",
    "rations_d8",
    "rations_d10",
    "lv",
    "xp",
];

pub const TEXT: &[&str] = &[
    "character_name",
    "folk",
    "homeland",
    "proficiencies",
    "conditions",
    "deficiencies",
    "heroic_titles",
    "dread",
    "worn",
    "carried",
    "material_elemental",
    "material_fish",
    "material_beast",
    "material_herb",
    "ideals",
    "flaws",
    "personal_quest",
    "backstory",
    "relationships",
    "other_notes",
    "hidden_class",
    "version",
];

pub const BOOLEAN: &[&str] = &["overburdened", "tired"];

pub const SAVE_SLOTS: &[&str] = &["1", "2", "3"];
pub const TOGGLE: &[&str] = &["true", "false"];
pub const CLASSES: &[&str] = &[
    "bard",
    "dungeoneer",
    "gnome",
    "knight-errant",
    "loyal-chum",
    "rascal",
];
pub const TABS: &[&str] = &[
    "attributes",
    "inventory",
    "background",
    "notes",
    "history",
    "settings",
];

/// Single-choice attributes with their option lists and defaults.
pub const CHOICES: &[(&str, &[&str], &str)] = &[
    ("save_slot", SAVE_SLOTS, "1"),
    ("clamp_modifiers", TOGGLE, "true"),
    ("clamp_roll_modifier", TOGGLE, "false"),
    ("class", CLASSES, ""),
    ("sheetTab", TABS, "attributes"),
];

/// Look up the definition of `key`, if it is part of the sheet.
pub fn lookup(key: &str) -> Option<AttributeDef> {
    if let Some(k) = SIGNED.iter().find(|k| **k == key) {
        return Some(AttributeDef {
            key: k,
            kind: AttributeKind::Signed,
            default: "+0",
        });
    }
    if let Some(k) = UNSIGNED.iter().find(|k| **k == key) {
        return Some(AttributeDef {
            key: k,
            kind: AttributeKind::Unsigned,
            default: "",
        });
    }
    if let Some(k) = TEXT.iter().find(|k| **k == key) {
        return Some(AttributeDef {
            key: k,
            kind: AttributeKind::Text,
            default: "",
        });
    }
    if let Some(k) = BOOLEAN.iter().find(|k| **k == key) {
        return Some(AttributeDef {
            key: k,
            kind: AttributeKind::Boolean,
            default: "false",
        });
    }
    CHOICES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(k, options, default)| AttributeDef {
            key: k,
            kind: AttributeKind::SingleChoice(options),
            default,
        })
}

/// Every catalog entry, grouped by kind in declaration order.
pub fn catalog() -> impl Iterator<Item = AttributeDef> {
    SIGNED
        .iter()
        .chain(UNSIGNED)
        .chain(TEXT)
        .chain(BOOLEAN)
        .chain(CHOICES.iter().map(|(k, _, _)| k))
        .filter_map(|k| lookup(k))
}

/// Parse the leading integer of `input`.
///
/// Skips leading whitespace, accepts one optional sign and then as
/// many ASCII digits as follow. `"12abc"` is 12, `"+3"` is 3, `"abc"`
/// and `""` are `None`. A digit run too long for `i64` saturates.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let run: Vec<i64> = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if run.is_empty() {
        return None;
    }
    Some(run.into_iter().fold(0i64, |acc, d| {
        let acc = acc.saturating_mul(10);
        if negative {
            acc.saturating_sub(d)
        } else {
            acc.saturating_add(d)
        }
    }))
}

/// Saturate `value` into `[-3, +3]` when `clamp` is set.
pub fn clamp_signed(value: i64, clamp: bool) -> i64 {
    if clamp {
        value.clamp(CLAMP_MIN, CLAMP_MAX)
    } else {
        value
    }
}

/// Format a signed attribute value: `+N` for non-negative, `-N` otherwise.
pub fn format_signed(value: i64) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Canonical checkbox representation.
pub fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Read a checkbox value from any of the forms older snapshots used.
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

impl AttributeKind {
    /// Normalise `raw` for storage under this kind.
    ///
    /// Signed values coerce unparsable input to zero and honour the
    /// clamp policy. Unsigned values keep the empty string as "unset"
    /// and coerce any other garbage to `"0"`. A single-choice value
    /// outside the option list selects nothing and reads back empty.
    pub fn normalize(&self, raw: &str, clamp: bool) -> String {
        match self {
            Self::Signed => {
                let value = parse_int_prefix(raw).unwrap_or(0);
                format_signed(clamp_signed(value, clamp))
            }
            Self::Unsigned => {
                if raw.is_empty() {
                    String::new()
                } else {
                    parse_int_prefix(raw).unwrap_or(0).to_string()
                }
            }
            Self::Text => raw.to_string(),
            Self::Boolean => format_bool(parse_bool(raw)).to_string(),
            Self::SingleChoice(options) => options
                .iter()
                .find(|o| **o == raw)
                .map(|o| (*o).to_string())
                .unwrap_or_default(),
        }
    }
}
