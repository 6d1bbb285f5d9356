//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the sheet's workflows. Each use case is a self-contained
//! operation over the ports it needs.
//!
//! Use cases:
//! - `CharacterSheet`: Attribute change dispatch, entries, slots, snapshots
//! - `PersistenceCoordinator`: Debounced, slot-aware storage writes
//! - `RollService`: Checks, notifications and the room roll history

pub mod persistence;
pub mod roll_service;
pub mod sheet;

pub use persistence::PersistenceCoordinator;
pub use roll_service::{RollOutcome, RollService};
pub use sheet::CharacterSheet;
