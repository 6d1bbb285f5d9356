//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! backends. Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `host`: Player identity, notifications and room metadata
//! - `persistence`: File and in-memory key-value storage
//! - `prompt`: Modal prompt answered from a queue

pub mod host;
pub mod persistence;
pub mod prompt;
