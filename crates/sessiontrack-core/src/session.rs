//! The slice of a work session this core touches, and the store it writes to.
//!
//! Sessions belong to an external store. A tracker reads `duration` and
//! `status` when it is created and afterwards only writes them back through
//! [`SessionSink`].

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Paused,
}

impl SessionStatus {
    /// The spelling the session store uses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a stored session taken when tracking begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub status: SessionStatus,
    /// Persisted accumulated time in seconds.
    #[serde(default)]
    pub duration: u64,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            status: SessionStatus::InProgress,
            duration: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, secs: u64) -> Self {
        self.duration = secs;
        self
    }
}

/// Write-back side of the external session store.
///
/// Calls are synchronous and fire-and-forget: the tracker never retries them
/// and has already committed its own state when they run.
pub trait SessionSink {
    fn on_duration_change(&self, session_id: &str, duration_secs: u64) -> Result<(), SinkError>;

    fn on_status_change(&self, session_id: &str, status: SessionStatus) -> Result<(), SinkError>;
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SessionSink for NullSink {
    fn on_duration_change(&self, _session_id: &str, _duration_secs: u64) -> Result<(), SinkError> {
        Ok(())
    }

    fn on_status_change(&self, _session_id: &str, _status: SessionStatus) -> Result<(), SinkError> {
        Ok(())
    }
}

/// One write received by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Duration { session_id: String, secs: u64 },
    Status { session_id: String, status: SessionStatus },
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    calls: Vec<SinkCall>,
    failing: bool,
}

/// In-memory sink that records every write.
///
/// Clones share the same log. While `set_failing(true)` is in effect every
/// write is rejected but still logged, which is what hosts and tests use to
/// exercise the failure path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().calls.clone()
    }

    /// Most recent duration written for `session_id`.
    pub fn last_duration(&self, session_id: &str) -> Option<u64> {
        self.lock().calls.iter().rev().find_map(|c| match c {
            SinkCall::Duration { session_id: id, secs } if id == session_id => Some(*secs),
            _ => None,
        })
    }

    /// Most recent status written for `session_id`.
    pub fn last_status(&self, session_id: &str) -> Option<SessionStatus> {
        self.lock().calls.iter().rev().find_map(|c| match c {
            SinkCall::Status { session_id: id, status } if id == session_id => Some(*status),
            _ => None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, session_id: &str, call: SinkCall) -> Result<(), SinkError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.failing {
            return Err(SinkError::Rejected {
                session_id: session_id.to_string(),
                message: "sink is failing".into(),
            });
        }
        Ok(())
    }
}

impl SessionSink for MemorySink {
    fn on_duration_change(&self, session_id: &str, duration_secs: u64) -> Result<(), SinkError> {
        self.record(
            session_id,
            SinkCall::Duration {
                session_id: session_id.to_string(),
                secs: duration_secs,
            },
        )
    }

    fn on_status_change(&self, session_id: &str, status: SessionStatus) -> Result<(), SinkError> {
        self.record(
            session_id,
            SinkCall::Status {
                session_id: session_id.to_string(),
                status,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_store_spelling() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        for status in [SessionStatus::InProgress, SessionStatus::Completed, SessionStatus::Paused] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json.trim_matches('"'), status.to_string());
        }
    }

    #[test]
    fn failing_memory_sink_still_logs() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        assert!(sink.on_duration_change("s1", 30).is_err());
        assert_eq!(sink.last_duration("s1"), Some(30));
        sink.set_failing(false);
        assert!(sink.on_status_change("s1", SessionStatus::Paused).is_ok());
        assert_eq!(sink.last_status("s1"), Some(SessionStatus::Paused));
    }
}
