use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub raised_at: Instant,
}

/// A single transient toast slot. Raising a notification replaces the
/// previous one; it disappears on its own once `ttl` has elapsed.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    slot: Mutex<Option<Notification>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn raise(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => warn!(%message, "Error notification"),
            _ => info!(%message, ?severity, "Notification"),
        }
        *self.slot.lock().expect("notifier mutex poisoned") = Some(Notification {
            message,
            severity,
            raised_at: Instant::now(),
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.raise(Severity::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.raise(Severity::Error, message)
    }

    /// The visible notification, if one was raised and has not yet expired.
    pub fn active(&self) -> Option<Notification> {
        self.latest()
            .filter(|n| n.raised_at.elapsed() < self.ttl)
    }

    /// The last notification raised, expired or not, until dismissed.
    pub fn latest(&self) -> Option<Notification> {
        self.slot.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn dismiss_all(&self) {
        self.slot.lock().expect("notifier mutex poisoned").take();
    }
}
