//! Session Management
//!
//! - `InMemorySessionStore`: default [`SessionStore`], a `HashMap` behind a
//!   `parking_lot` lock. Sessions do not survive restarts.
//! - `SessionManager`: wraps any store with per-session turn serialization
//!   and background expiry.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use concierge_config::SessionConfig;
use concierge_core::{Result, Session, SessionStore};

/// In-memory session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().get(id).cloned())
    }

    async fn put(&self, session: Session) -> Result<()> {
        self.sessions.write().insert(session.id.clone(), session);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.write().remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.read().values().cloned().collect())
    }

    async fn purge_expired(&self, timeout: Duration) -> Result<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(timeout, now));
        Ok(before - sessions.len())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.sessions.read().len())
    }
}

/// Held by a turn from session load to save
pub type TurnGuard = OwnedMutexGuard<()>;

/// Session manager
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    /// One lock per session id; a turn holds it from load to save
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            store,
            turn_locks: DashMap::new(),
            session_timeout,
            cleanup_interval,
        }
    }

    pub fn from_config(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self::new(store, config.timeout(), config.cleanup_interval())
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Start a background task that periodically removes expired sessions.
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        match manager.purge_expired().await {
                            Ok(0) => {}
                            Ok(removed) => {
                                tracing::info!(removed, "Session cleanup removed expired sessions")
                            }
                            Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Remove sessions idle past the timeout, and their turn locks
    pub async fn purge_expired(&self) -> Result<usize> {
        let removed = self.store.purge_expired(self.session_timeout).await?;
        if removed > 0 {
            let live: Vec<String> =
                self.store.list().await?.into_iter().map(|s| s.id).collect();
            // Locks currently held by a turn stay; the turn saves the session back
            self.turn_locks
                .retain(|id, lock| live.contains(id) || Arc::strong_count(lock) > 1);
        }
        crate::metrics::record_sessions_active(self.store.count().await?);
        Ok(removed)
    }

    /// Acquire the turn lock for a session id.
    ///
    /// Turns on the same session run one at a time; different sessions do
    /// not contend.
    pub async fn lock(&self, id: &str) -> TurnGuard {
        let lock = self
            .turn_locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Lock an existing session for a turn.
    ///
    /// `None` when the session does not exist, including when it was deleted
    /// while this call waited for the lock. No lock entry is left behind on
    /// the `None` path.
    pub async fn lock_existing(&self, id: &str) -> Result<Option<(TurnGuard, Session)>> {
        if self.store.get(id).await?.is_none() {
            return Ok(None);
        }

        let guard = self.lock(id).await;
        match self.store.get(id).await? {
            Some(session) => Ok(Some((guard, session))),
            None => {
                drop(guard);
                self.release_lock(id);
                Ok(None)
            }
        }
    }

    /// Lock the requested session, or a fresh one under a new UUID when
    /// `requested` is absent or unknown
    pub async fn checkout(&self, requested: Option<&str>) -> Result<(TurnGuard, Session)> {
        if let Some(id) = requested {
            if let Some((guard, mut session)) = self.lock_existing(id).await? {
                session.touch();
                return Ok((guard, session));
            }
            tracing::debug!(session_id = %id, "Unknown session id, creating a new session");
        }

        let session = Session::with_random_id();
        tracing::info!(session_id = %session.id, "Created session");
        let guard = self.lock(&session.id).await;
        Ok((guard, session))
    }

    /// Drop the lock entry for `id` unless a turn holds or awaits it
    fn release_lock(&self, id: &str) {
        self.turn_locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub async fn get(&self, id: &str) -> Result<Option<Session>> {
        self.store.get(id).await
    }

    pub async fn save(&self, mut session: Session) -> Result<()> {
        session.touch();
        self.store.put(session).await?;
        crate::metrics::record_sessions_active(self.store.count().await?);
        Ok(())
    }

    /// Delete a session once any running turn on it has saved
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let existed = match self.lock_existing(id).await? {
            Some((guard, _)) => {
                let existed = self.store.delete(id).await?;
                drop(guard);
                self.release_lock(id);
                existed
            }
            None => false,
        };
        crate::metrics::record_sessions_active(self.store.count().await?);
        Ok(existed)
    }

    pub async fn list(&self) -> Result<Vec<Session>> {
        self.store.list().await
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }
}
