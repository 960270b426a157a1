use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{CatalogDetail, ProfileStats};

/// Process-wide cache of the last-computed derived data, keyed by user id.
///
/// Values are replaced wholesale (never mutated in place), so concurrent
/// readers observe either the old or new complete value. Entries are dropped
/// only by explicit invalidation; this is a session-scoped cache, not an LRU.
#[derive(Default)]
pub struct SessionCache {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

#[derive(Default, Clone)]
struct SessionEntry {
    stats: Option<Arc<ProfileStats>>,
    recommendations: Option<Arc<Vec<CatalogDetail>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stats(&self, user_id: Uuid) -> Option<Arc<ProfileStats>> {
        let sessions = self.sessions.read().await;
        sessions.get(&user_id).and_then(|s| s.stats.clone())
    }

    pub async fn store_stats(&self, user_id: Uuid, stats: Arc<ProfileStats>) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_default().stats = Some(stats);
    }

    pub async fn recommendations(&self, user_id: Uuid) -> Option<Arc<Vec<CatalogDetail>>> {
        let sessions = self.sessions.read().await;
        sessions.get(&user_id).and_then(|s| s.recommendations.clone())
    }

    pub async fn store_recommendations(
        &self,
        user_id: Uuid,
        recommendations: Arc<Vec<CatalogDetail>>,
    ) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_default().recommendations = Some(recommendations);
    }

    /// Drops all derived data for one user (explicit refresh, sign-out)
    pub async fn invalidate(&self, user_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&user_id);
    }

    /// Drops every entry (identity change at process level)
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.clear();
    }
}

/// Per-key serialization of expensive computations.
///
/// Callers take the lock for their user, then re-check the session cache
/// before computing: a second caller arriving mid-computation blocks on the
/// lock and finds the first caller's result in the cache instead of issuing
/// redundant external calls. Dropping a waiting caller releases its place in
/// the queue.
#[derive(Default)]
pub struct SingleFlight {
    locks: std::sync::Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock guarding computations for the given user.
    ///
    /// Entries accumulate per user like the session cache itself; both are
    /// bounded by the active-user population.
    pub fn lock_for(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("single-flight lock poisoned");
        locks.entry(user_id).or_default().clone()
    }
}
