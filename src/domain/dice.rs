//! Dice engine.
//!
//! Produces unbiased die faces from a cryptographically strong source
//! and aggregates multi-die rolls with advantage/disadvantage tracking.
//! Pure apart from the random source: no I/O, never blocks.
//!
//! Bias removal uses rejection sampling: a uniformly random `u32` that
//! lands in the remainder band above the largest multiple of `sides`
//! is discarded and redrawn.

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::error::SheetError;

/// Outcome of rolling one or more identical dice.
///
/// `total` is the first die plus the modifier, kept for single-roll
/// callers; `sum` adds every die to the modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// Faces in the order they were rolled.
    pub rolls: Vec<i32>,
    /// Flat modifier applied to every total.
    pub modifier: i32,
    /// Modifier plus every face.
    pub sum: i32,
    /// First face plus modifier.
    pub total: i32,
    /// Highest face seen.
    pub advantage_roll: i32,
    /// Lowest face seen (`sides + 1` when nothing was rolled).
    pub disadvantage_roll: i32,
    /// Highest face plus modifier.
    pub advantage_total: i32,
    /// Lowest face plus modifier.
    pub disadvantage_total: i32,
}

/// Roll a single die with `sides` faces using the OS random source.
///
/// # Errors
/// `SheetError::InvalidArgument` when `sides <= 0`.
pub fn roll_die(sides: i32) -> Result<i32, SheetError> {
    roll_die_with(&mut OsRng, sides)
}

/// Roll a single die drawing from `rng`.
///
/// # Errors
/// `SheetError::InvalidArgument` when `sides <= 0`.
pub fn roll_die_with<R: RngCore + ?Sized>(rng: &mut R, sides: i32) -> Result<i32, SheetError> {
    if sides <= 0 {
        return Err(SheetError::InvalidArgument(format!(
            "number of sides must be greater than 0, got {sides}"
        )));
    }

    let sides_u32 = sides.unsigned_abs();
    let limit = u32::MAX - (u32::MAX % sides_u32);

    let value = loop {
        let candidate = rng.next_u32();
        if candidate < limit {
            break candidate;
        }
    };

    // value % sides < sides <= i32::MAX
    Ok((value % sides_u32) as i32 + 1)
}

/// Roll `count` dice with `sides` faces and aggregate them.
///
/// # Errors
/// `SheetError::InvalidArgument` when `sides <= 0`.
pub fn roll_dice(sides: i32, count: usize, modifier: i32) -> Result<RollResult, SheetError> {
    roll_dice_with(&mut OsRng, sides, count, modifier)
}

/// Roll `count` dice drawing from `rng`.
///
/// # Errors
/// `SheetError::InvalidArgument` when `sides <= 0`.
pub fn roll_dice_with<R: RngCore + ?Sized>(
    rng: &mut R,
    sides: i32,
    count: usize,
    modifier: i32,
) -> Result<RollResult, SheetError> {
    if sides <= 0 {
        return Err(SheetError::InvalidArgument(format!(
            "number of sides must be greater than 0, got {sides}"
        )));
    }

    let mut result = RollResult {
        rolls: Vec::with_capacity(count),
        modifier,
        sum: modifier,
        total: 0,
        advantage_roll: 0,
        disadvantage_roll: sides.saturating_add(1),
        advantage_total: 0,
        disadvantage_total: 0,
    };

    for _ in 0..count {
        let face = roll_die_with(rng, sides)?;
        if result.rolls.is_empty() {
            result.total = face.saturating_add(modifier);
        }
        result.rolls.push(face);
        result.sum = result.sum.saturating_add(face);

        if face > result.advantage_roll {
            result.advantage_roll = face;
            result.advantage_total = face.saturating_add(modifier);
        }
        if face < result.disadvantage_roll {
            result.disadvantage_roll = face;
            result.disadvantage_total = face.saturating_add(modifier);
        }
    }

    Ok(result)
}

/// Most dice a parsed expression will roll; larger counts are capped.
pub const MAX_EXPR_DICE: usize = 100;

/// A `XdY` die expression such as the `dread` attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    pub count: usize,
    pub sides: i32,
}

impl DiceExpr {
    /// Parse `XdY`, case-insensitive.
    ///
    /// Returns `None` unless the text splits into exactly two parts on
    /// `d`. Unparsable halves fall back to one die and four sides, and
    /// the count is capped at [`MAX_EXPR_DICE`].
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.to_lowercase();
        let mut parts = lowered.split('d');
        let count_part = parts.next()?;
        let sides_part = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let count = super::attribute::parse_int_prefix(count_part)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .map_or(1, |n| n.min(MAX_EXPR_DICE));
        let sides = super::attribute::parse_int_prefix(sides_part)
            .filter(|n| *n != 0)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(4);

        Some(Self { count, sides })
    }

    /// Roll the expression with no modifier.
    ///
    /// # Errors
    /// `SheetError::InvalidArgument` when the side count is not positive.
    pub fn roll(&self) -> Result<RollResult, SheetError> {
        roll_dice(self.sides, self.count, 0)
    }
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    /// Replays a fixed list of raw draws.
    struct Scripted(Vec<u32>);

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.0.remove(0)
        }
        fn next_u64(&mut self) -> u64 {
            u64::from(self.next_u32())
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest {
                *b = self.next_u32() as u8;
            }
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_roll_die_in_range() {
        for sides in [1, 2, 4, 6, 12, 20, 100] {
            for _ in 0..200 {
                let face = roll_die(sides).unwrap();
                assert!((1..=sides).contains(&face), "d{sides} gave {face}");
            }
        }
    }

    #[test]
    fn test_roll_die_rejects_non_positive_sides() {
        assert!(matches!(roll_die(0), Err(SheetError::InvalidArgument(_))));
        assert!(matches!(roll_die(-6), Err(SheetError::InvalidArgument(_))));
        assert!(matches!(roll_dice(0, 2, 0), Err(SheetError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejection_band_is_redrawn() {
        // For d6 the accepted band is [0, 4294967292).
        let mut rng = Scripted(vec![u32::MAX, 4_294_967_292, 7]);
        let face = roll_die_with(&mut rng, 6).unwrap();
        assert_eq!(face, 7 % 6 + 1);
        assert!(rng.0.is_empty());
    }

    #[test]
    fn test_step_rng_wraps_past_rejected_value() {
        let mut rng = StepRng::new(u64::from(u32::MAX), 1);
        assert_eq!(roll_die_with(&mut rng, 6).unwrap(), 1);
    }

    #[test]
    fn test_distribution_covers_all_faces() {
        let mut counts = [0usize; 12];
        let draws = 24_000;
        for _ in 0..draws {
            let face = roll_die(12).unwrap();
            counts[(face - 1) as usize] += 1;
        }
        let expected = draws as f64 / 12.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        // 11 degrees of freedom; 0.1% critical value is ~31.3
        assert!(chi_square < 31.3, "chi-square too high: {chi_square}");
    }

    #[test]
    fn test_two_dice_aggregation() {
        let result = roll_dice(6, 2, 0).unwrap();
        assert_eq!(result.rolls.len(), 2);
        assert!(result.advantage_roll >= result.disadvantage_roll);
        assert_eq!(result.total, result.rolls[0]);
        assert_eq!(result.sum, result.rolls[0] + result.rolls[1]);
    }

    #[test]
    fn test_scripted_advantage_and_disadvantage() {
        // d12: raw 2 -> face 3, raw 9 -> face 10
        let mut rng = Scripted(vec![2, 9]);
        let result = roll_dice_with(&mut rng, 12, 2, 1).unwrap();
        assert_eq!(result.rolls, vec![3, 10]);
        assert_eq!(result.total, 4);
        assert_eq!(result.sum, 14);
        assert_eq!(result.advantage_roll, 10);
        assert_eq!(result.advantage_total, 11);
        assert_eq!(result.disadvantage_roll, 3);
        assert_eq!(result.disadvantage_total, 4);
    }

    #[test]
    fn test_total_fixed_even_when_first_total_is_zero() {
        // face 2 with modifier -2 totals zero; the second die must not replace it
        let mut rng = Scripted(vec![1, 5]);
        let result = roll_dice_with(&mut rng, 12, 2, -2).unwrap();
        assert_eq!(result.rolls, vec![2, 6]);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_extreme_modifier_saturates() {
        let result = roll_dice(12, 2, i32::MAX).unwrap();
        assert_eq!(result.total, i32::MAX);
        assert_eq!(result.sum, i32::MAX);
        assert_eq!(result.advantage_total, i32::MAX);
        assert_eq!(result.disadvantage_total, i32::MAX);

        let result = roll_dice(12, 1, i32::MIN).unwrap();
        assert_eq!(result.total, i32::MIN + result.rolls[0]);
    }

    #[test]
    fn test_single_die_totals_agree() {
        let result = roll_dice(12, 1, 3).unwrap();
        assert_eq!(result.advantage_total, result.total);
        assert_eq!(result.disadvantage_total, result.total);
    }

    #[test]
    fn test_zero_count_keeps_sentinels() {
        let result = roll_dice(8, 0, 2).unwrap();
        assert!(result.rolls.is_empty());
        assert_eq!(result.sum, 2);
        assert_eq!(result.disadvantage_roll, 9);
        assert_eq!(result.advantage_roll, 0);
    }

    #[test]
    fn test_dice_expr_parse() {
        assert_eq!(DiceExpr::parse("1d4"), Some(DiceExpr { count: 1, sides: 4 }));
        assert_eq!(DiceExpr::parse("2D10"), Some(DiceExpr { count: 2, sides: 10 }));
        assert_eq!(DiceExpr::parse("d8"), Some(DiceExpr { count: 1, sides: 8 }));
        assert_eq!(DiceExpr::parse("xdy"), Some(DiceExpr { count: 1, sides: 4 }));
        assert_eq!(DiceExpr::parse("12"), None);
        assert_eq!(DiceExpr::parse("1d4d6"), None);
        assert_eq!(DiceExpr { count: 1, sides: 10 }.to_string(), "1d10");
        assert_eq!(
            DiceExpr::parse("99999999999999999999d4"),
            Some(DiceExpr { count: MAX_EXPR_DICE, sides: 4 })
        );
    }
}
