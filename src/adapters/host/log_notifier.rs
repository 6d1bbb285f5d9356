//! Log Notifier - Notifications as Structured Log Events
//!
//! Emits every notification through `tracing` and keeps the most
//! recent ones so the shell can echo them back to the user.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tracing::info;

use crate::ports::notifier::Notifier;

/// Notifications kept for `recent()`.
const RECENT_CAPACITY: usize = 32;

/// A published notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct LogNotifier {
    recent: Mutex<VecDeque<Notification>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain notifications published since the last call.
    pub fn take_recent(&self) -> Vec<Notification> {
        self.recent
            .lock()
            .map(|mut r| r.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Notifier for LogNotifier {
    fn publish(&self, title: &str, message: &str, duration: Duration) {
        info!(
            title,
            message,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "Notification"
        );
        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(Notification {
                title: title.to_string(),
                message: message.to_string(),
                duration,
            });
        }
    }
}
