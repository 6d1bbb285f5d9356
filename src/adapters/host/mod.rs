//! Host Adapters - Local Stand-ins for Platform Services
//!
//! Player identity from configuration, notifications as log events,
//! and an in-process room metadata map.

pub mod local_player;
pub mod log_notifier;
pub mod room_history;

pub use local_player::LocalPlayer;
pub use log_notifier::LogNotifier;
pub use room_history::InMemoryRoom;
