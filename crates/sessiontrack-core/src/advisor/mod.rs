//! Break Advisor - threshold checks over tracked sessions
//!
//! The advisor is polled periodically (60s by default) with the activity of
//! every tracked session and raises notifications into a bounded log.
//!
//! ## Checks
//!
//! - **Break reminder**: a session has been running for `break_interval`
//!   minutes and the local hour is outside quiet hours.
//! - **Session timeout**: a session has been running for `session_timeout`
//!   minutes. Quiet hours do not apply.
//! - **Daily summary**: once per day from `summary_hour`, today's tracked
//!   time across sessions.
//!
//! Every check evaluates thresholds from scratch, so a session still over a
//! threshold on the next check raises the same kind of notification again.
//! The log cap keeps this bounded.

mod config;
mod notification;

pub use config::{AdvisorConfig, QuietHours};
pub use notification::{Notification, NotificationAction, NotificationKind, NotificationLog};

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local, NaiveDate, Timelike};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::ticker::{NoopTicker, Tick, TickGuard, Ticker};
use crate::timer::{format_duration, SessionActivity, TimerEngine};

pub struct BreakAdvisor {
    config: AdvisorConfig,
    enabled: bool,
    log: NotificationLog,
    last_summary: Option<NaiveDate>,
    ticker: Arc<dyn Ticker>,
    /// Held while enabled.
    check_tick: Option<TickGuard>,
}

impl BreakAdvisor {
    /// Create an enabled advisor. Fails if `config` does not validate.
    pub fn new(config: AdvisorConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let log = NotificationLog::new(config.max_notifications);
        let mut advisor = Self {
            config,
            enabled: true,
            log,
            last_summary: None,
            ticker: Arc::new(NoopTicker),
            check_tick: None,
        };
        advisor.arm();
        Ok(advisor)
    }

    pub fn with_ticker(mut self, ticker: Arc<dyn Ticker>) -> Self {
        self.ticker = ticker;
        self.arm();
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling cancels the periodic check and makes `check` a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.arm();
    }

    /// Stop the periodic check without disabling the advisor.
    pub fn dispose(&mut self) {
        self.check_tick = None;
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> + Clone {
        self.log.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.log.get(id)
    }

    pub fn dismiss(&mut self, id: &str) -> Option<Notification> {
        self.log.dismiss(id)
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        self.log.mark_read(id)
    }

    pub fn clear_all(&mut self) {
        self.log.clear();
    }

    pub fn prune_expired(&mut self, now: DateTime<Local>) -> usize {
        self.log.prune_expired(now)
    }

    /// Run every enabled check against `sessions` and return what was raised.
    pub fn check(&mut self, now: DateTime<Local>, sessions: &[SessionActivity]) -> Vec<Notification> {
        if !self.enabled {
            return Vec::new();
        }
        self.log.prune_expired(now);

        let window = Duration::minutes(i64::from(self.config.recent_window_min));
        let recent: Vec<&SessionActivity> = sessions
            .iter()
            .filter(|s| {
                s.running_secs.is_some() || s.last_active.is_some_and(|t| now - t < window)
            })
            .collect();

        let mut raised = Vec::new();
        if self.config.break_reminders && !self.config.quiet_hours.contains(now.hour()) {
            raised.extend(self.break_reminders(now, &recent));
        }
        if self.config.session_timeouts {
            raised.extend(self.session_timeouts(now, &recent));
        }
        if self.config.daily_summaries {
            raised.extend(self.daily_summary(now, sessions));
        }

        for notification in &raised {
            info!(
                kind = ?notification.kind,
                title = %notification.title,
                "notification raised"
            );
            self.log.push(notification.clone());
        }
        debug!(inspected = recent.len(), raised = raised.len(), "advisor check done");
        raised
    }

    /// Convenience over [`check`](Self::check) for live engines.
    pub fn check_engines<'a>(
        &mut self,
        now: DateTime<Local>,
        engines: impl IntoIterator<Item = &'a TimerEngine>,
    ) -> Vec<Notification> {
        let sessions: Vec<SessionActivity> = engines.into_iter().map(|e| e.activity()).collect();
        self.check(now, &sessions)
    }

    /// Invoke the action of notification `id` on `engine`.
    ///
    /// Pause actions call [`TimerEngine::take_break`]. The notification is
    /// removed from the log once the engine acted on it, including when the
    /// store write failed afterwards. Returns `Ok(None)` and keeps the
    /// notification if it is gone, has no action, targets another session,
    /// or the engine had nothing to pause.
    pub fn take_action(&mut self, id: &str, engine: &mut TimerEngine) -> Result<Option<Event>> {
        let Some(action) = self.log.get(id).and_then(|n| n.action.clone()) else {
            return Ok(None);
        };
        if action.session_id() != engine.session_id() {
            return Ok(None);
        }
        let outcome = match action {
            NotificationAction::PauseSession { .. } => engine.take_break(),
        };
        if !matches!(outcome, Ok(None)) {
            self.log.dismiss(id);
        }
        outcome
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self) {
        self.check_tick = None;
        if self.enabled {
            let period = StdDuration::from_secs(self.config.check_interval_secs);
            self.check_tick = Some(self.ticker.every(period, Tick::advisor()));
        }
    }

    fn break_reminders(&self, now: DateTime<Local>, sessions: &[&SessionActivity]) -> Vec<Notification> {
        let threshold = self.config.break_interval_secs();
        sessions
            .iter()
            .filter_map(|s| Some((s, s.running_secs.filter(|&secs| secs >= threshold)?)))
            .map(|(s, secs)| {
                Notification::new(
                    NotificationKind::Break,
                    "Break Reminder",
                    format!(
                        "You've been working for {} minutes. Time for a break!",
                        whole_minutes(secs)
                    ),
                    now,
                )
                .with_action(NotificationAction::PauseSession {
                    label: "Take Break".into(),
                    session_id: s.session_id.clone(),
                })
            })
            .collect()
    }

    fn session_timeouts(&self, now: DateTime<Local>, sessions: &[&SessionActivity]) -> Vec<Notification> {
        let threshold = self.config.session_timeout_secs();
        sessions
            .iter()
            .filter_map(|s| Some((s, s.running_secs.filter(|&secs| secs >= threshold)?)))
            .map(|(s, secs)| {
                let name = s.title.as_deref().unwrap_or(&s.session_id);
                Notification::new(
                    NotificationKind::Timeout,
                    "Session Timeout",
                    format!(
                        "Your session \"{name}\" has been running for {} minutes. Consider taking a break.",
                        whole_minutes(secs)
                    ),
                    now,
                )
                .with_action(NotificationAction::PauseSession {
                    label: "Pause Session".into(),
                    session_id: s.session_id.clone(),
                })
            })
            .collect()
    }

    fn daily_summary(&mut self, now: DateTime<Local>, sessions: &[SessionActivity]) -> Option<Notification> {
        let today = now.date_naive();
        if now.hour() < u32::from(self.config.summary_hour) || self.last_summary == Some(today) {
            return None;
        }
        let tracked: u64 = sessions.iter().map(|s| s.today_secs).sum();
        if tracked == 0 {
            return None;
        }
        self.last_summary = Some(today);
        let active: Vec<&SessionActivity> = sessions.iter().filter(|s| s.today_secs > 0).collect();
        let completed = active.iter().filter(|s| s.completed).count();
        Some(Notification::new(
            NotificationKind::Summary,
            "Daily Summary",
            format!(
                "Today you tracked {} across {} sessions ({} completed).",
                format_duration(tracked),
                active.len(),
                completed
            ),
            now,
        ))
    }
}

impl std::fmt::Debug for BreakAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakAdvisor")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .field("notifications", &self.log.len())
            .field("check_tick", &self.check_tick)
            .finish()
    }
}

fn whole_minutes(secs: u64) -> u64 {
    (secs + 30) / 60
}
