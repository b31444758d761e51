//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine bound to one session.
//! It does not use internal threads. While running it holds a display tick
//! from its [`Ticker`]; the host answers each [`Tick`] by calling `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Stopped
//!   ^__________ reset (from any state) ___|
//! ```
//!
//! Invalid transitions are absorbed: the command returns `None`/`Ok(None)`
//! and nothing changes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(session, sink).with_clock(clock);
//! engine.start();
//! // On every display tick:
//! engine.tick();
//! engine.pause()?; // finalizes an entry and writes the new duration
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::accumulator::DurationAccumulator;
use super::ledger::{EntryLedger, TimeEntry};
use crate::clock::{elapsed_secs, Clock, SystemClock};
use crate::error::{Result, SinkError};
use crate::events::Event;
use crate::session::{Session, SessionSink, SessionStatus};
use crate::ticker::{NoopTicker, Tick, TickGuard, Ticker};

/// Display refresh period while running.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Terminal for this tracker. Only `reset()` leaves it.
    Stopped,
}

/// What the break advisor needs to know about one tracked session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionActivity {
    pub session_id: String,
    pub title: Option<String>,
    /// Seconds in the current running interval; `None` unless running.
    pub running_secs: Option<u64>,
    /// Start of the running interval, or end of the newest finalized entry.
    pub last_active: Option<DateTime<Local>>,
    pub completed: bool,
    pub today_secs: u64,
}

/// Core timer engine for one session.
pub struct TimerEngine {
    session: Session,
    state: TimerState,
    /// Start of the current running interval.
    started_at: Option<DateTime<Local>>,
    ledger: EntryLedger,
    accumulator: DurationAccumulator,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn SessionSink>,
    ticker: Arc<dyn Ticker>,
    tick_period: Duration,
    /// Held only while running.
    display_tick: Option<TickGuard>,
}

impl TimerEngine {
    /// Create a tracker for `session`, starting `Idle`.
    ///
    /// The session's current duration becomes the base the accumulator adds
    /// to.
    pub fn new(session: Session, sink: Arc<dyn SessionSink>) -> Self {
        let accumulator = DurationAccumulator::new(session.duration);
        Self {
            session,
            state: TimerState::Idle,
            started_at: None,
            ledger: EntryLedger::new(),
            accumulator,
            clock: Arc::new(SystemClock),
            sink,
            ticker: Arc::new(NoopTicker),
            tick_period: DEFAULT_TICK_PERIOD,
            display_tick: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ticker(mut self, ticker: Arc<dyn Ticker>, period: Duration) -> Self {
        self.ticker = ticker;
        self.tick_period = period;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn ledger(&self) -> &EntryLedger {
        &self.ledger
    }

    pub fn entries(&self) -> std::slice::Iter<'_, TimeEntry> {
        self.ledger.entries()
    }

    pub fn is_ticking(&self) -> bool {
        self.display_tick.is_some()
    }

    /// Seconds in the current running interval, derived fresh from the clock.
    pub fn elapsed_secs(&self) -> u64 {
        match (self.state, self.started_at) {
            (TimerState::Running, Some(start)) => elapsed_secs(start, self.clock.now()),
            _ => 0,
        }
    }

    pub fn persisted_secs(&self) -> u64 {
        self.accumulator.persisted()
    }

    /// Persisted duration plus the live interval.
    pub fn total_secs(&self) -> u64 {
        self.accumulator.total_with(self.elapsed_secs())
    }

    pub fn today_secs(&self) -> u64 {
        self.ledger.today_duration(self.clock.now())
    }

    pub fn activity(&self) -> SessionActivity {
        let running_secs = (self.state == TimerState::Running).then(|| self.elapsed_secs());
        let last_active = self.started_at.or_else(|| {
            self.ledger
                .entries()
                .rev()
                .find_map(|e| e.end_time)
        });
        SessionActivity {
            session_id: self.session.id.clone(),
            title: self.session.title.clone(),
            running_secs,
            last_active,
            completed: self.session.status == SessionStatus::Completed,
            today_secs: self.today_secs(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            session_id: self.session.id.clone(),
            state: self.state,
            elapsed_secs: self.elapsed_secs(),
            persisted_secs: self.persisted_secs(),
            total_secs: self.total_secs(),
            today_secs: self.today_secs(),
            entry_count: self.ledger.len(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) tracking. Ignored while running or once stopped.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                let now = self.clock.now();
                let description = self
                    .session
                    .title
                    .as_ref()
                    .map(|t| format!("Work session - {t}"));
                let entry_id = self.ledger.open(now, description)?.id.clone();
                self.started_at = Some(now);
                self.state = TimerState::Running;
                self.display_tick = Some(
                    self.ticker
                        .every(self.tick_period, Tick::display(self.session.id.clone())),
                );
                debug!(session_id = %self.session.id, %entry_id, "timer started");
                Some(Event::TimerStarted {
                    session_id: self.session.id.clone(),
                    entry_id,
                    at: now,
                })
            }
            TimerState::Running => None, // Already running.
            TimerState::Stopped => {
                debug!(session_id = %self.session.id, "start ignored: tracker is stopped");
                None
            }
        }
    }

    /// Finalize the running interval and persist the new duration.
    ///
    /// Returns `Err` only when the session store rejects the write; the entry
    /// and the accumulator are committed either way.
    pub fn pause(&mut self) -> Result<Option<Event>> {
        if self.state != TimerState::Running {
            return Ok(None);
        }
        let Some((entry_id, entry_secs, now)) = self.finalize_running() else {
            return Ok(None);
        };
        self.state = TimerState::Paused;
        let persisted_secs = self.accumulator.persisted();
        self.session.duration = persisted_secs;
        debug!(session_id = %self.session.id, entry_secs, persisted_secs, "timer paused");

        self.push_duration(persisted_secs)?;
        Ok(Some(Event::TimerPaused {
            session_id: self.session.id.clone(),
            entry_id,
            entry_secs,
            persisted_secs,
            at: now,
        }))
    }

    /// Finish tracking. Finalizes a running interval, marks the session
    /// completed and writes the final duration.
    pub fn stop(&mut self) -> Result<Option<Event>> {
        let entry_secs = match self.state {
            TimerState::Running => self.finalize_running().map(|(_, secs, _)| secs),
            TimerState::Paused => None,
            TimerState::Idle | TimerState::Stopped => return Ok(None),
        };
        self.state = TimerState::Stopped;
        let persisted_secs = self.accumulator.persisted();
        self.session.duration = persisted_secs;
        self.session.status = SessionStatus::Completed;
        info!(session_id = %self.session.id, persisted_secs, "timer stopped");

        // Both writes are attempted; the first failure is reported.
        let duration = self.push_duration(persisted_secs);
        let status = self.push_status(SessionStatus::Completed);
        duration.and(status)?;

        Ok(Some(Event::TimerStopped {
            session_id: self.session.id.clone(),
            entry_secs,
            persisted_secs,
            entry_count: self.ledger.len(),
            at: self.clock.now(),
        }))
    }

    /// Clear every entry and zero the persisted duration, from any state.
    ///
    /// The store is told the duration is now 0.
    pub fn reset(&mut self) -> Result<Option<Event>> {
        self.display_tick = None;
        self.started_at = None;
        self.ledger.clear();
        self.accumulator.reset();
        self.state = TimerState::Idle;
        self.session.duration = 0;
        info!(session_id = %self.session.id, "timer reset");

        self.push_duration(0)?;
        Ok(Some(Event::TimerReset {
            session_id: self.session.id.clone(),
            at: self.clock.now(),
        }))
    }

    /// Pause on behalf of a break or timeout notification and mark the
    /// session `Paused` in the store.
    ///
    /// Ignored unless running or paused: an idle or completed session is
    /// never marked paused.
    pub fn take_break(&mut self) -> Result<Option<Event>> {
        if !matches!(self.state, TimerState::Running | TimerState::Paused) {
            return Ok(None);
        }
        let paused = self.pause();
        self.session.status = SessionStatus::Paused;
        let status = self.push_status(SessionStatus::Paused);
        let event = paused?;
        status?;
        Ok(event.or_else(|| Some(self.snapshot())))
    }

    /// Display refresh. Recomputes the live interval; writes nothing.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        Some(Event::TimerTick {
            session_id: self.session.id.clone(),
            elapsed_secs: self.elapsed_secs(),
            total_secs: self.total_secs(),
            at: self.clock.now(),
        })
    }

    /// Re-send the persisted duration recomputed from the ledger.
    ///
    /// Used after a store failure; returns the value sent.
    pub fn resync(&mut self) -> Result<u64> {
        let secs = self
            .accumulator
            .base()
            .saturating_add(self.ledger.total_duration());
        self.session.duration = secs;
        self.push_duration(secs)?;
        Ok(secs)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Close the open entry and fold it. Releases the display tick.
    fn finalize_running(&mut self) -> Option<(String, u64, DateTime<Local>)> {
        self.display_tick = None;
        let start = self.started_at.take();
        let now = self.clock.now();
        if let Some(start) = start {
            if now < start {
                warn!(
                    session_id = %self.session.id,
                    %start,
                    %now,
                    "clock moved backwards; entry clamped to 0s"
                );
            }
        }
        let entry = self.ledger.finalize_open(now)?;
        let entry_id = entry.id.clone();
        let secs = entry.duration_secs();
        self.accumulator.fold(secs);
        Some((entry_id, secs, now))
    }

    fn push_duration(&self, secs: u64) -> std::result::Result<(), SinkError> {
        self.sink
            .on_duration_change(&self.session.id, secs)
            .inspect_err(|e| {
                warn!(session_id = %self.session.id, secs, error = %e, "duration write failed")
            })
    }

    fn push_status(&self, status: SessionStatus) -> std::result::Result<(), SinkError> {
        self.sink
            .on_status_change(&self.session.id, status)
            .inspect_err(|e| {
                warn!(session_id = %self.session.id, ?status, error = %e, "status write failed")
            })
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .field("entries", &self.ledger.len())
            .field("accumulator", &self.accumulator)
            .field("display_tick", &self.display_tick)
            .finish()
    }
}
