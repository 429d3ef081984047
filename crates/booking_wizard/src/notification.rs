use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::booking_types::NotificationLevel;

/// Receives every user-facing message the wizard raises.
/// Presentation (duration, styling) is up to the implementation.
pub trait NotificationSink: Send + Sync {
    /// Shows a message at the given level
    fn notify(&self, level: NotificationLevel, message: &str);

    /// Neutral information
    fn info(&self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }

    /// Something worked
    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    /// The guest needs to fix something
    fn warning(&self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    /// Something failed
    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}

/// A message raised by the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the guest
    pub message: String,
    /// When it was raised
    pub created_at: DateTime<Utc>,
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(?level, "{}", message)
            }
            NotificationLevel::Warning => warn!("{}", message),
            NotificationLevel::Error => error!("{}", message),
        }
    }
}

/// Buffers notifications until a UI adapter drains them for rendering
#[derive(Debug, Default)]
pub struct CollectingNotificationSink {
    notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotificationSink {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything raised so far
    pub fn drain(&self) -> Vec<Notification> {
        let mut notifications = self
            .notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *notifications)
    }

    /// Copies everything raised so far without clearing it
    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of buffered notifications at `level`
    pub fn count(&self, level: NotificationLevel) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|notification| notification.level == level)
            .count()
    }
}

impl NotificationSink for CollectingNotificationSink {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Notification {
                level,
                message: message.to_string(),
                created_at: Utc::now(),
            });
    }
}

/// Forwards every notification to each wrapped sink, in order
pub struct FanOutNotificationSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanOutNotificationSink {
    /// Wraps the given sinks
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

impl NotificationSink for FanOutNotificationSink {
    fn notify(&self, level: NotificationLevel, message: &str) {
        for sink in &self.sinks {
            sink.notify(level, message);
        }
    }
}
