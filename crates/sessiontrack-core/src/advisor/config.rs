//! Break advisor settings.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Local time-of-day window in which break reminders are suppressed.
///
/// `start > end` wraps midnight (22..8 covers 22:00 to 07:59). `start == end`
/// is an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub start: u8,
    pub end: u8,
}

impl QuietHours {
    pub fn contains(&self, hour: u32) -> bool {
        let (start, end) = (self.start as u32, self.end as u32);

        // Overnight window (e.g., 22:00 - 08:00)
        if start > end {
            return hour >= start || hour < end;
        }

        // Daytime window (e.g., 12:00 - 17:00)
        hour >= start && hour < end
    }
}

impl Default for QuietHours {
    fn default() -> Self {
        Self { start: 22, end: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_true")]
    pub break_reminders: bool,
    #[serde(default = "default_true")]
    pub session_timeouts: bool,
    #[serde(default = "default_true")]
    pub daily_summaries: bool,
    /// Accepted for compatibility with stored settings; no check uses it.
    #[serde(default = "default_true")]
    pub productivity_alerts: bool,
    /// Minutes of continuous running before a break reminder.
    #[serde(default = "default_break_interval")]
    pub break_interval: u32,
    /// Minutes of continuous running before a timeout warning.
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u32,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Sessions idle longer than this are not inspected.
    #[serde(default = "default_recent_window_min")]
    pub recent_window_min: u32,
    #[serde(default = "default_max_notifications")]
    pub max_notifications: usize,
    /// Local hour from which the daily summary may be raised.
    #[serde(default = "default_summary_hour")]
    pub summary_hour: u8,
    #[serde(default)]
    pub quiet_hours: QuietHours,
}

fn default_true() -> bool {
    true
}
fn default_break_interval() -> u32 {
    25
}
fn default_session_timeout() -> u32 {
    120
}
fn default_check_interval_secs() -> u64 {
    60
}
fn default_recent_window_min() -> u32 {
    120
}
fn default_max_notifications() -> usize {
    10
}
fn default_summary_hour() -> u8 {
    18
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            break_reminders: true,
            session_timeouts: true,
            daily_summaries: true,
            productivity_alerts: true,
            break_interval: default_break_interval(),
            session_timeout: default_session_timeout(),
            check_interval_secs: default_check_interval_secs(),
            recent_window_min: default_recent_window_min(),
            max_notifications: default_max_notifications(),
            summary_hour: default_summary_hour(),
            quiet_hours: QuietHours::default(),
        }
    }
}

impl AdvisorConfig {
    pub fn break_interval_secs(&self) -> u64 {
        u64::from(self.break_interval) * 60
    }

    pub fn session_timeout_secs(&self) -> u64 {
        u64::from(self.session_timeout) * 60
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        fn invalid(field: &str, message: &str) -> ValidationError {
            ValidationError::InvalidValue {
                field: field.to_string(),
                message: message.to_string(),
            }
        }

        if self.break_interval == 0 {
            return Err(invalid("advisor.break_interval", "must be at least 1 minute"));
        }
        if self.session_timeout == 0 {
            return Err(invalid("advisor.session_timeout", "must be at least 1 minute"));
        }
        if self.quiet_hours.start > 23 {
            return Err(invalid("advisor.quiet_hours.start", "hour must be 0-23"));
        }
        if self.quiet_hours.end > 23 {
            return Err(invalid("advisor.quiet_hours.end", "hour must be 0-23"));
        }
        if self.check_interval_secs == 0 {
            return Err(invalid("advisor.check_interval_secs", "must be positive"));
        }
        if self.max_notifications == 0 {
            return Err(invalid("advisor.max_notifications", "must keep at least one"));
        }
        if self.summary_hour > 23 {
            return Err(invalid("advisor.summary_hour", "hour must be 0-23"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overnight_quiet_hours() {
        let quiet = QuietHours { start: 22, end: 8 };
        assert!(quiet.contains(23));
        assert!(quiet.contains(0));
        assert!(quiet.contains(7));
        assert!(!quiet.contains(8));
        assert!(!quiet.contains(14));
    }

    #[test]
    fn daytime_and_empty_quiet_hours() {
        let quiet = QuietHours { start: 12, end: 14 };
        assert!(quiet.contains(12));
        assert!(!quiet.contains(14));
        assert!(!QuietHours { start: 9, end: 9 }.contains(9));
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = AdvisorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.break_interval_secs(), 25 * 60);
        assert_eq!(cfg.session_timeout_secs(), 120 * 60);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cfg = AdvisorConfig {
            break_interval: 0,
            ..AdvisorConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdvisorConfig {
            quiet_hours: QuietHours { start: 24, end: 8 },
            ..AdvisorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
