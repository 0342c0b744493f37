//! User-visible notifications.
//!
//! Notifications are best effort: they are collected by the controller and
//! rendered as toasts by the UI, and every one is mirrored to the log so a
//! headless run still records what the user would have seen.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Bounded toast list. Oldest entries fall off once `capacity` is reached.
#[derive(Debug)]
pub struct Notifications {
    items: Vec<Notification>,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

impl Notifications {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                log::error!(target: "dropzone::notify", "{}", notification.message)
            }
            NotificationLevel::Warning => {
                log::warn!(target: "dropzone::notify", "{}", notification.message)
            }
            NotificationLevel::Success | NotificationLevel::Info => {
                log::info!(target: "dropzone::notify", "{}", notification.message)
            }
        }

        if self.items.len() == self.capacity {
            self.items.remove(0);
        }
        self.items.push(notification);
    }

    pub fn prune(&mut self, now: Instant, ttl: Duration) {
        self.items.retain(|n| !n.is_expired(now, ttl));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
