//! Roll presentation: modes, labels, messages and the shared history.

use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::dice::RollResult;
use super::error::SheetError;

/// How a check is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    /// Dice thrown for this mode.
    pub fn dice_count(self) -> usize {
        match self {
            Self::Normal => 1,
            Self::Advantage | Self::Disadvantage => 2,
        }
    }

    /// Result the mode keeps.
    pub fn pick(self, result: &RollResult) -> i32 {
        match self {
            Self::Normal => result.total,
            Self::Advantage => result.advantage_total,
            Self::Disadvantage => result.disadvantage_total,
        }
    }

    /// `(3)`, `[A](3, 9)` or `[D](3, 9)`.
    pub fn describe(self, result: &RollResult) -> String {
        let faces = result
            .rolls
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            Self::Normal => format!("({faces})"),
            Self::Advantage => format!("[A]({faces})"),
            Self::Disadvantage => format!("[D]({faces})"),
        }
    }
}

impl FromStr for RollMode {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "n" => Ok(Self::Normal),
            "advantage" | "adv" | "a" => Ok(Self::Advantage),
            "disadvantage" | "dis" | "d" => Ok(Self::Disadvantage),
            other => Err(SheetError::InvalidArgument(format!("unknown roll mode '{other}'"))),
        }
    }
}

impl std::fmt::Display for RollMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Advantage => write!(f, "advantage"),
            Self::Disadvantage => write!(f, "disadvantage"),
        }
    }
}

/// Human label for an attribute key: first letter upper-cased, first
/// underscore turned into a space (`treasure_hunting` → `Treasure hunting`).
pub fn attribute_label(key: &str) -> String {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest: String = chars.collect();
    format!("{}{}", first.to_uppercase(), rest.replacen('_', " ", 1))
}

/// `(7) + 2 = <b>9</b>`
pub fn roll_message(description: &str, modifier: i32, result: i32) -> String {
    let sign = if modifier >= 0 { " + " } else { " - " };
    format!(
        "{description}{sign}{} = <b>{result}</b>",
        modifier.unsigned_abs()
    )
}

/// History line for the room log: markup flattened to plain text.
pub fn history_line(time: NaiveTime, player: &str, label: &str, message: &str) -> String {
    let plain = message
        .replacen("<br>", " | ", 1)
        .replace("<b>", "")
        .replace("</b>", "");
    format!("[{}] {player} - {label}: {plain}", time.format("%H:%M:%S"))
}

/// Prepend `entry` to `history`, keeping at most `max_entries` lines.
pub fn prepend_history(history: &str, entry: &str, max_entries: usize) -> String {
    let mut lines: Vec<&str> = history
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() >= max_entries {
        lines.truncate(max_entries.saturating_sub(1));
    }
    format!("{entry}\n{}", lines.join("\n"))
}
