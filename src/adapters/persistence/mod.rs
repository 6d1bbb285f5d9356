//! Persistence Adapters - Key-Value Storage Backends
//!
//! Implements the `KeyValueStorage` port with atomic per-key JSON
//! files for real use and a journalled in-memory map for tests and
//! ephemeral sessions.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStorage;
pub use memory_store::MemoryStorage;
