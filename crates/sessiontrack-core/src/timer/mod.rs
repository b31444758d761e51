mod accumulator;
mod engine;
mod ledger;

pub use accumulator::DurationAccumulator;
pub use engine::{SessionActivity, TimerEngine, TimerState, DEFAULT_TICK_PERIOD};
pub use ledger::{EntryLedger, TimeEntry};

/// Render seconds as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
