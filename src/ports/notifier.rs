//! Notification Port - Broadcast Sink Interface
//!
//! Fire-and-forget: the sheet never waits for delivery.

use std::time::Duration;

/// Trait for notification sinks.
pub trait Notifier: Send + Sync + 'static {
  /// Show `message` under `title` for roughly `duration`.
  fn publish(&self, title: &str, message: &str, duration: Duration);
}
