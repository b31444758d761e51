use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::advisor::Notification;
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The host renders them; a session store may also consume them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_id: String,
        entry_id: String,
        at: DateTime<Local>,
    },
    TimerPaused {
        session_id: String,
        entry_id: String,
        /// Duration of the entry that was just finalized.
        entry_secs: u64,
        persisted_secs: u64,
        at: DateTime<Local>,
    },
    TimerStopped {
        session_id: String,
        /// Set when the timer was running and an entry was finalized by the stop.
        entry_secs: Option<u64>,
        persisted_secs: u64,
        entry_count: usize,
        at: DateTime<Local>,
    },
    TimerReset {
        session_id: String,
        at: DateTime<Local>,
    },
    /// Live display refresh while running. Never persisted.
    TimerTick {
        session_id: String,
        elapsed_secs: u64,
        total_secs: u64,
        at: DateTime<Local>,
    },
    StateSnapshot {
        session_id: String,
        state: TimerState,
        elapsed_secs: u64,
        persisted_secs: u64,
        total_secs: u64,
        today_secs: u64,
        entry_count: usize,
        at: DateTime<Local>,
    },
    NotificationRaised {
        notification: Notification,
    },
}

impl From<Notification> for Event {
    fn from(notification: Notification) -> Self {
        Event::NotificationRaised { notification }
    }
}
