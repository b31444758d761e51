use std::collections::VecDeque;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Break,
    Timeout,
    Summary,
    Alert,
    Achievement,
}

impl NotificationKind {
    /// How long a notification of this kind stays listed.
    pub fn display_ms(self) -> u64 {
        match self {
            NotificationKind::Break => 10_000,
            NotificationKind::Timeout => 15_000,
            NotificationKind::Summary => 8_000,
            NotificationKind::Alert => 12_000,
            NotificationKind::Achievement => 10_000,
        }
    }
}

/// The single primary action a notification may offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationAction {
    PauseSession { label: String, session_id: String },
}

impl NotificationAction {
    pub fn label(&self) -> &str {
        match self {
            NotificationAction::PauseSession { label, .. } => label,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            NotificationAction::PauseSession { session_id, .. } => session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Auto-expiry after `timestamp`, in milliseconds.
    #[serde(default)]
    pub expires_after_ms: Option<u64>,
    #[serde(default)]
    pub action: Option<NotificationAction>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// New unread notification with the kind's default display duration.
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp,
            expires_after_ms: Some(kind.display_ms()),
            action: None,
            read: false,
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        match self.expires_after_ms {
            Some(ms) => now >= self.timestamp + Duration::milliseconds(ms as i64),
            None => false,
        }
    }
}

/// Bounded, most-recent-first notification list.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    items: VecDeque<Notification>,
    cap: usize,
}

impl NotificationLog {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Insert at the front, dropping the oldest beyond the cap.
    pub fn push(&mut self, notification: Notification) {
        self.items.push_front(notification);
        self.items.truncate(self.cap);
    }

    /// Drop expired notifications; returns how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Local>) -> usize {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired(now));
        before - self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn dismiss(&mut self, id: &str) -> Option<Notification> {
        let idx = self.items.iter().position(|n| n.id == id)?;
        self.items.remove(idx)
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> + Clone {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }
}
