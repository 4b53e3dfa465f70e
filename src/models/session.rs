use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp;

/// Subject used when the caller starts a session with an empty label.
pub const DEFAULT_SUBJECT: &str = "Study Session";

/// The one session per browsing context. `is_paused` is only meaningful
/// while `is_running`, and `start_time` is present iff `is_running`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_running: bool,
    pub is_paused: bool,
    pub elapsed_seconds: u64,
    pub subject: String,
    pub start_time: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            elapsed_seconds: 0,
            subject: DEFAULT_SUBJECT.to_string(),
            start_time: None,
        }
    }
}

impl SessionState {
    pub fn begin(&mut self, subject: String, started_at: DateTime<Utc>) {
        *self = Self {
            is_running: true,
            is_paused: false,
            elapsed_seconds: 0,
            subject,
            start_time: Some(started_at),
        };
    }

    pub fn pause(&mut self) {
        if self.is_running {
            self.is_paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.is_running {
            self.is_paused = false;
        }
    }

    /// One second of active study time. Paused and idle states are frozen.
    pub fn tick(&mut self) {
        if self.ticking() {
            self.elapsed_seconds += 1;
        }
    }

    pub fn ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whole minutes for the completed record, rounded half-up, never
    /// below 1 so a saved session is always visible in history.
    pub fn duration_minutes(&self) -> u64 {
        cmp::max(1, (self.elapsed_seconds + 30) / 60)
    }

    /// The durable reload snapshot; `None` when there is nothing worth
    /// persisting (idle, or running without a start time).
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        match (self.is_running, self.start_time) {
            (true, Some(start_time)) => Some(SessionSnapshot {
                is_running: self.is_running,
                is_paused: self.is_paused,
                subject: self.subject.clone(),
                start_time,
            }),
            _ => None,
        }
    }

    /// Rebuild a session after a reload. Elapsed time is recomputed from
    /// the wall-clock delta since `start_time`, not from a stored counter,
    /// so time spent with the context closed (or paused before the reload)
    /// counts as active time. The flags are restored verbatim afterwards.
    pub fn from_snapshot(snapshot: &SessionSnapshot, now: DateTime<Utc>) -> Self {
        let elapsed_seconds = (now - snapshot.start_time).num_seconds().max(0) as u64;
        Self {
            is_running: snapshot.is_running,
            is_paused: snapshot.is_paused,
            elapsed_seconds,
            subject: snapshot.subject.clone(),
            start_time: Some(snapshot.start_time),
        }
    }
}

/// Minimal durable record needed to reconstruct a running session.
/// `elapsed_seconds` is deliberately absent; recovery recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_running: bool,
    pub is_paused: bool,
    pub subject: String,
    pub start_time: DateTime<Utc>,
}

/// Row written to the system of record when a session ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_minutes: u64,
}
