//! JSON-file session store used by the CLI host.
//!
//! Stands in for the dashboard's session database: it hands the tracker the
//! session's current duration and status, and receives write-backs through
//! [`SessionSink`]. Stored at `~/.config/sessiontrack/sessions.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sessiontrack_core::{Session, SessionSink, SessionStatus, SinkError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    sessions: BTreeMap<String, Session>,
}

#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> std::io::Result<Self> {
        Ok(Self::new(sessiontrack_core::storage::data_dir()?.join("sessions.json")))
    }

    pub fn get(&self, id: &str) -> Result<Option<Session>, SinkError> {
        Ok(self.read()?.sessions.get(id).cloned())
    }

    pub fn list(&self) -> Result<Vec<Session>, SinkError> {
        Ok(self.read()?.sessions.into_values().collect())
    }

    /// Insert or replace a session record.
    pub fn put(&self, session: &Session) -> Result<(), SinkError> {
        let mut file = self.read()?;
        file.sessions.insert(session.id.clone(), session.clone());
        self.write(&file)
    }

    fn read(&self) -> Result<StoreFile, SinkError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| SinkError::Unavailable(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(SinkError::Unavailable(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write(&self, file: &StoreFile) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(file)
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| SinkError::Unavailable(format!("{}: {e}", self.path.display())))
    }

    fn update(&self, session_id: &str, apply: impl FnOnce(&mut Session)) -> Result<(), SinkError> {
        let mut file = self.read()?;
        let session = file
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SinkError::Rejected {
                session_id: session_id.to_string(),
                message: "no such session".into(),
            })?;
        apply(session);
        self.write(&file)
    }
}

impl SessionSink for JsonSessionStore {
    fn on_duration_change(&self, session_id: &str, duration_secs: u64) -> Result<(), SinkError> {
        self.update(session_id, |s| s.duration = duration_secs)
    }

    fn on_status_change(&self, session_id: &str, status: SessionStatus) -> Result<(), SinkError> {
        self.update(session_id, |s| s.status = status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_back_duration_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("sessions.json"));
        store.put(&Session::new("s1").with_duration(30)).unwrap();

        store.on_duration_change("s1", 120).unwrap();
        store.on_status_change("s1", SessionStatus::Completed).unwrap();

        let session = store.get("s1").unwrap().unwrap();
        assert_eq!(session.duration, 120);
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn unknown_session_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("sessions.json"));
        let err = store.on_duration_change("missing", 10).unwrap_err();
        assert!(matches!(err, SinkError::Rejected { .. }));
    }

    #[test]
    fn corrupt_file_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonSessionStore::new(path);
        assert!(matches!(store.get("s1"), Err(SinkError::Unavailable(_))));
    }
}
