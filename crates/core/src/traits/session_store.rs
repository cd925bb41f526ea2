//! Session store abstraction

use async_trait::async_trait;
use std::time::Duration;

use crate::{Result, Session};

/// Key-value store for sessions, injected into the serving layer.
///
/// Implementations own creation-time bookkeeping and expiry. The
/// orchestrator only reads and writes session fields.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Insert or replace a session
    async fn put(&self, session: Session) -> Result<()>;

    /// Delete a session; returns whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Snapshot of all live sessions
    async fn list(&self) -> Result<Vec<Session>>;

    /// Remove sessions idle longer than `timeout`; returns the number removed
    async fn purge_expired(&self, timeout: Duration) -> Result<usize>;

    /// Number of stored sessions
    async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }
}
