use serde::{Deserialize, Serialize};

/// Authoritative persisted duration of one tracked session.
///
/// Only finalized entries are folded in. The live elapsed value shown while
/// running is added on read by [`DurationAccumulator::total_with`] and never
/// stored here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationAccumulator {
    /// Duration the session already had when tracking began.
    base_secs: u64,
    /// Sum of entries finalized by this tracker.
    folded_secs: u64,
}

impl DurationAccumulator {
    pub fn new(base_secs: u64) -> Self {
        Self {
            base_secs,
            folded_secs: 0,
        }
    }

    /// Fold a finalized entry and return the new persisted duration.
    pub fn fold(&mut self, entry_secs: u64) -> u64 {
        self.folded_secs = self.folded_secs.saturating_add(entry_secs);
        self.persisted()
    }

    pub fn persisted(&self) -> u64 {
        self.base_secs.saturating_add(self.folded_secs)
    }

    pub fn base(&self) -> u64 {
        self.base_secs
    }

    /// Display total: persisted plus the running interval, if any.
    pub fn total_with(&self, live_elapsed_secs: u64) -> u64 {
        self.persisted().saturating_add(live_elapsed_secs)
    }

    /// Zero everything, including the pre-existing base.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
