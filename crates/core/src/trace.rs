use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::payload::Payload;
use crate::domain::session::SessionId;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub summary: String,
}

impl TraceEntry {
    pub fn new(
        agent: impl Into<String>,
        action: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            timestamp: Utc::now(),
            action: action.into(),
            summary: summary.into(),
        }
    }

    /// Builds the entry for a completed step from the payload the agent returned.
    pub fn from_payload(agent: impl Into<String>, payload: &Payload) -> Self {
        Self::new(agent, payload.action(), payload.summary())
    }
}

pub trait TraceSink: Send + Sync {
    fn append(&self, session_id: &SessionId, entry: TraceEntry);
    fn entries(&self, session_id: &SessionId) -> Vec<TraceEntry>;
}

type SessionLog = Arc<Mutex<Vec<TraceEntry>>>;

#[derive(Default)]
struct Sessions {
    logs: HashMap<SessionId, SessionLog>,
    created: VecDeque<SessionId>,
}

/// Process-local, append-only trace store keyed by session.
///
/// Each session owns its own entry list, so appends for different sessions only
/// contend on the outer map while a session is first created. The store keeps at
/// most `capacity` sessions; creating one more evicts the oldest session.
pub struct TraceStore {
    capacity: usize,
    sessions: RwLock<Sessions>,
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl TraceStore {
    pub fn with_capacity(max_sessions: usize) -> Self {
        Self { capacity: max_sessions.max(1), sessions: RwLock::new(Sessions::default()) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn session_count(&self) -> usize {
        self.read_sessions().logs.len()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.read_sessions().logs.contains_key(session_id)
    }

    pub fn clear(&self) {
        let mut sessions = self.write_sessions();
        sessions.logs.clear();
        sessions.created.clear();
    }

    fn session_log(&self, session_id: &SessionId) -> SessionLog {
        if let Some(log) = self.read_sessions().logs.get(session_id) {
            return Arc::clone(log);
        }

        let mut sessions = self.write_sessions();
        if let Some(log) = sessions.logs.get(session_id) {
            return Arc::clone(log);
        }

        while sessions.logs.len() >= self.capacity {
            let Some(oldest) = sessions.created.pop_front() else {
                break;
            };
            sessions.logs.remove(&oldest);
            debug!(
                event_name = "trace.session.evicted",
                session_id = %oldest,
                capacity = self.capacity,
                "evicted oldest trace session"
            );
        }

        let log = SessionLog::default();
        sessions.logs.insert(session_id.clone(), Arc::clone(&log));
        sessions.created.push_back(session_id.clone());
        log
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, Sessions> {
        match self.sessions.read() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, Sessions> {
        match self.sessions.write() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn lock_log(log: &SessionLog) -> MutexGuard<'_, Vec<TraceEntry>> {
    match log.lock() {
        Ok(entries) => entries,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl TraceSink for TraceStore {
    fn append(&self, session_id: &SessionId, entry: TraceEntry) {
        let log = self.session_log(session_id);
        lock_log(&log).push(entry);
    }

    fn entries(&self, session_id: &SessionId) -> Vec<TraceEntry> {
        let log = self.read_sessions().logs.get(session_id).map(Arc::clone);
        log.map(|log| lock_log(&log).clone()).unwrap_or_default()
    }
}
