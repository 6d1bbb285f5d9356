//! Domain layer - Sheet rules and models.
//!
//! Pure logic for the character sheet: attribute catalog, derived-stat
//! propagation, the repeating collection, validation and dice.
//! No I/O here (hexagonal architecture inner ring).

pub mod attribute;
pub mod collection;
pub mod dice;
pub mod entry;
pub mod error;
pub mod propagation;
pub mod record;
pub mod roll;
pub mod store;
pub mod validation;

// Re-export core types for convenience
pub use attribute::{AttributeDef, AttributeKind, REPEATING_KEY};
pub use collection::RepeatingCollection;
pub use dice::{DiceExpr, RollResult, roll_dice, roll_die};
pub use entry::{Entry, EntryId, RepeatingKey};
pub use error::SheetError;
pub use propagation::Propagator;
pub use record::{Record, RecordPatch};
pub use roll::RollMode;
pub use store::{AttributeChange, AttributeStore, WriteOrigin};
