//! Append-only record of tracked intervals.
//!
//! Entries are appended open and finalized in place exactly once. Nothing is
//! removed except by [`EntryLedger::clear`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::elapsed_secs;

/// One contiguous start-to-finalize interval of active tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub start_time: DateTime<Local>,
    /// Absent while the entry is open.
    #[serde(default)]
    pub end_time: Option<DateTime<Local>>,
    /// Seconds; set together with `end_time`.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TimeEntry {
    fn open(start_time: DateTime<Local>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            duration: None,
            description,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Finalized duration, or 0 while open.
    pub fn duration_secs(&self) -> u64 {
        self.duration.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryLedger {
    entries: Vec<TimeEntry>,
}

impl EntryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an open entry starting at `start_time`.
    ///
    /// Returns `None` and leaves the ledger untouched if an entry is already
    /// open: at most one open entry exists at any time.
    pub fn open(
        &mut self,
        start_time: DateTime<Local>,
        description: Option<String>,
    ) -> Option<&TimeEntry> {
        if self.open_entry().is_some() {
            return None;
        }
        self.entries.push(TimeEntry::open(start_time, description));
        self.entries.last()
    }

    /// Close the open entry at `end_time`.
    ///
    /// The duration is `end_time - start_time` in whole seconds, clamped at 0.
    /// Returns `None` when no entry is open.
    pub fn finalize_open(&mut self, end_time: DateTime<Local>) -> Option<&TimeEntry> {
        let entry = self.entries.last_mut().filter(|e| e.is_open())?;
        entry.end_time = Some(end_time);
        entry.duration = Some(elapsed_secs(entry.start_time, end_time));
        Some(entry)
    }

    pub fn open_entry(&self) -> Option<&TimeEntry> {
        // Only the newest entry can be open.
        self.entries.last().filter(|e| e.is_open())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in the order they were opened.
    ///
    /// The iterator is lazy and can be cloned to restart from the beginning.
    pub fn entries(&self) -> std::slice::Iter<'_, TimeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finalized_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_open()).count()
    }

    /// Sum of finalized durations.
    pub fn total_duration(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.duration).sum()
    }

    /// Sum of finalized durations for entries started on `now`'s local date.
    pub fn today_duration(&self, now: DateTime<Local>) -> u64 {
        let today = now.date_naive();
        self.entries
            .iter()
            .filter(|e| e.start_time.date_naive() == today)
            .filter_map(|e| e.duration)
            .sum()
    }
}

impl<'a> IntoIterator for &'a EntryLedger {
    type Item = &'a TimeEntry;
    type IntoIter = std::slice::Iter<'a, TimeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
