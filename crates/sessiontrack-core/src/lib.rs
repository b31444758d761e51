//! # SessionTrack Core Library
//!
//! This library provides the session time tracking logic for the SessionTrack
//! dashboard: a live clock bound to one work session, the record of tracked
//! intervals, the persisted duration written back to the session store, and
//! break/timeout notifications derived from elapsed time.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine per session. The
//!   host answers its display ticks by calling `tick()`
//! - **Entry Ledger**: Append-only time entries with total/today queries
//! - **Duration Accumulator**: Persisted duration, folded on pause/stop only
//! - **Break Advisor**: Periodic threshold checks with a bounded notification log
//! - **Storage**: TOML-based configuration
//!
//! Everything runs on the caller's thread. Time comes from an injectable
//! [`Clock`] and periodic callbacks from an injectable [`Ticker`].
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`BreakAdvisor`]: Break and timeout notifications
//! - [`SessionSink`]: Write-back interface of the external session store
//! - [`Config`]: Application configuration management

pub mod advisor;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use advisor::{
    AdvisorConfig, BreakAdvisor, Notification, NotificationAction, NotificationKind, QuietHours,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, SinkError, ValidationError};
pub use events::Event;
pub use session::{MemorySink, NullSink, Session, SessionSink, SessionStatus, SinkCall};
pub use storage::{Config, TimerConfig};
pub use ticker::{ManualTicker, NoopTicker, Tick, TickGuard, TickKind, Ticker, TokioTicker};
pub use timer::{
    format_duration, DurationAccumulator, EntryLedger, SessionActivity, TimeEntry, TimerEngine,
    TimerState,
};
