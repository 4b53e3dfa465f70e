use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time,
};
use uuid::Uuid;

use crate::{
    db::Database,
    identity::IdentityProvider,
    models::{CompletedSession, SessionSnapshot, SessionState, DEFAULT_SUBJECT},
    snapshot::KeyValueStorage,
};

use super::{events::SessionEvent, format_time};

/// Storage key for the durable reload snapshot.
pub const SNAPSHOT_KEY: &str = "focusplus_study_session";

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// The system of record for completed sessions: one async insert,
/// returning success or a structured error.
pub trait CompletedSessionSink: Send + Sync + 'static {
    fn insert_completed(
        &self,
        record: CompletedSession,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl CompletedSessionSink for Database {
    async fn insert_completed(&self, record: CompletedSession) -> Result<()> {
        self.insert_completed_session(record).await
    }
}

/// Owns the session state machine, the one-second ticker, snapshot
/// persistence, and the durable write on `end()`. The single shared
/// ownership point for all interested views: observers subscribe for
/// events or read the state, only the lifecycle operations mutate.
pub struct SessionTimerStore<K, I, S>
where
    K: KeyValueStorage,
    I: IdentityProvider,
    S: CompletedSessionSink,
{
    state: Arc<Mutex<SessionState>>,
    storage: Arc<K>,
    identity: Arc<I>,
    sink: Arc<S>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    events: broadcast::Sender<SessionEvent>,
    // At most one outstanding end() per session.
    end_gate: Arc<Mutex<()>>,
}

impl<K, I, S> Clone for SessionTimerStore<K, I, S>
where
    K: KeyValueStorage,
    I: IdentityProvider,
    S: CompletedSessionSink,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            storage: self.storage.clone(),
            identity: self.identity.clone(),
            sink: self.sink.clone(),
            ticker: self.ticker.clone(),
            tick_interval: self.tick_interval,
            events: self.events.clone(),
            end_gate: self.end_gate.clone(),
        }
    }
}

impl<K, I, S> SessionTimerStore<K, I, S>
where
    K: KeyValueStorage,
    I: IdentityProvider,
    S: CompletedSessionSink,
{
    /// Build the store and run recovery once: read the persisted snapshot,
    /// recompute elapsed time from the wall clock, and resume ticking if
    /// the recovered session was running. Never fails on snapshot content.
    pub async fn load(storage: Arc<K>, identity: Arc<I>, sink: Arc<S>) -> Self {
        let state = recover_state(storage.as_ref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let store = Self {
            state: Arc::new(Mutex::new(state)),
            storage,
            identity,
            sink,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            events,
            end_gate: Arc::new(Mutex::new(())),
        };

        let resume_ticking = store.state.lock().await.ticking();
        if resume_ticking {
            store.spawn_ticker().await;
        }

        store
    }

    /// Read-only view of the current session.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Begin a session, replacing any active one. An empty subject falls
    /// back to the placeholder.
    pub async fn start(&self, subject: &str) -> SessionState {
        let trimmed = subject.trim();
        let subject = if trimmed.is_empty() {
            DEFAULT_SUBJECT.to_string()
        } else {
            trimmed.to_string()
        };

        let view = {
            let mut state = self.state.lock().await;
            state.begin(subject.clone(), Utc::now());
            self.persist(&state);
            state.clone()
        };

        self.spawn_ticker().await;
        self.emit(SessionEvent::Started { subject });

        view
    }

    /// Suspend ticking. Elapsed time freezes at its last tick value; the
    /// start time is untouched. Idempotent.
    pub async fn pause(&self) {
        let changed = {
            let mut state = self.state.lock().await;
            if state.is_running && !state.is_paused {
                state.pause();
                self.persist(&state);
                true
            } else {
                false
            }
        };

        if changed {
            self.cancel_ticker().await;
        }
    }

    /// Resume ticking from the frozen value. Idempotent.
    pub async fn resume(&self) {
        let changed = {
            let mut state = self.state.lock().await;
            if state.is_running && state.is_paused {
                state.resume();
                self.persist(&state);
                true
            } else {
                false
            }
        };

        if changed {
            self.spawn_ticker().await;
        }
    }

    /// Save the session to the system of record and reset to idle.
    ///
    /// Returns `Ok(None)` when there is nothing worth saving (no signed-in
    /// user or no start time). On a failed write the session is left
    /// untouched so the caller can retry without losing elapsed time.
    pub async fn end(&self) -> Result<Option<CompletedSession>> {
        let _gate = self
            .end_gate
            .try_lock()
            .map_err(|_| anyhow!("end() already in flight"))?;

        let record = {
            let state = self.state.lock().await;
            let Some(user_id) = self.identity.current_user_id() else {
                return Ok(None);
            };
            let Some(started_at) = state.start_time else {
                return Ok(None);
            };

            CompletedSession {
                id: Uuid::new_v4().to_string(),
                user_id,
                subject: state.subject.clone(),
                started_at,
                ended_at: Utc::now(),
                duration_minutes: state.duration_minutes(),
            }
        };

        if let Err(err) = self.sink.insert_completed(record.clone()).await {
            warn!("Failed to save completed session: {err:#}");
            self.emit(SessionEvent::SaveFailed {
                reason: err.to_string(),
            });
            return Err(err);
        }

        self.cancel_ticker().await;
        {
            let mut state = self.state.lock().await;
            self.emit(SessionEvent::Completed {
                subject: state.subject.clone(),
                duration: format_time(state.elapsed_seconds),
            });
            state.reset();
            self.persist(&state);
        }

        Ok(Some(record))
    }

    /// Advisory message for the host's before-unload hook: present while a
    /// session is running for a signed-in user. The host may show it; it
    /// cannot block navigation and guarantees nothing about durability.
    pub async fn unload_warning(&self) -> Option<String> {
        let state = self.state.lock().await;
        if state.is_running && self.identity.current_user_id().is_some() {
            Some("You have an active study session. Are you sure you want to leave?".to_string())
        } else {
            None
        }
    }

    /// Overwrite the snapshot while running, remove it otherwise.
    /// Best-effort: the in-memory state stays authoritative for this
    /// context, so write failures are logged and never surfaced.
    fn persist(&self, state: &SessionState) {
        match state.snapshot() {
            Some(snapshot) => match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    if let Err(err) = self.storage.set(SNAPSHOT_KEY, &json) {
                        warn!("Failed to persist session snapshot: {err:#}");
                    }
                }
                Err(err) => warn!("Failed to encode session snapshot: {err}"),
            },
            None => {
                if let Err(err) = self.storage.remove(SNAPSHOT_KEY) {
                    warn!("Failed to clear session snapshot: {err:#}");
                }
            }
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first tick of a tokio interval completes immediately;
            // consume it so every counted tick lands one interval later.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut guard = state.lock().await;
                if !guard.ticking() {
                    break;
                }
                guard.tick();
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; these are advisory.
        let _ = self.events.send(event);
    }
}

fn recover_state<K: KeyValueStorage>(storage: &K) -> SessionState {
    match storage.get(SNAPSHOT_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<SessionSnapshot>(&raw) {
            Ok(snapshot) => {
                let state = SessionState::from_snapshot(&snapshot, Utc::now());
                info!(
                    "Recovered in-progress session '{}' ({}s elapsed)",
                    state.subject, state.elapsed_seconds
                );
                state
            }
            Err(err) => {
                warn!("Discarding malformed session snapshot: {err}");
                if let Err(err) = storage.remove(SNAPSHOT_KEY) {
                    warn!("Failed to remove malformed snapshot: {err:#}");
                }
                SessionState::default()
            }
        },
        Ok(None) => SessionState::default(),
        Err(err) => {
            warn!("Failed to read session snapshot: {err:#}");
            SessionState::default()
        }
    }
}
