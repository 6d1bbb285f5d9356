//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the sheet needs from the
//! host environment. Adapters implement these traits.
//!
//! Port categories:
//! - `KeyValueStorage`: Durable record storage (slots)
//! - `ModifierPrompt`: Modal asking for one number
//! - `Notifier`: Fire-and-forget notification sink
//! - `PlayerIdentity` / `RoomMetadata`: Host platform services

pub mod host;
pub mod notifier;
pub mod prompt;
pub mod storage;
