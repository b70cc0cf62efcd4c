use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::{DiscoverySession, SearchOutcome, SessionDefaults};
use crate::services::{Dataset, Geocoder};

/// Shared handle to one discovery session
pub type SessionHandle = Arc<Mutex<DiscoverySession>>;

/// In-memory discovery sessions keyed by id
///
/// Bounded by entry count; sessions untouched for `idle_timeout` are evicted.
#[derive(Clone)]
pub struct SessionStore {
    sessions: moka::future::Cache<Uuid, SessionHandle>,
    dataset: Arc<Dataset>,
    defaults: SessionDefaults,
}

impl SessionStore {
    pub fn new(
        dataset: Arc<Dataset>,
        defaults: SessionDefaults,
        max_sessions: u64,
        idle_timeout: Duration,
    ) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(idle_timeout)
            .build();

        Self {
            sessions,
            dataset,
            defaults,
        }
    }

    /// A fresh session that is not registered in the store
    pub fn detached(&self) -> DiscoverySession {
        DiscoverySession::new(self.dataset.clone(), self.defaults)
    }

    /// Create and register a new session
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(self.detached()));

        self.sessions.insert(id, handle.clone()).await;
        tracing::debug!("Created session {}", id);

        (id, handle)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(id).await
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).await.is_some()
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Approximate number of live sessions
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }
}

/// Search a shared session without holding its lock across the geocoder call
///
/// A newer search or a reset while the geocoder runs turns this one stale.
pub async fn run_search(handle: &SessionHandle, geocoder: &dyn Geocoder, query: &str) -> SearchOutcome {
    let ticket = handle.lock().await.begin_search(query);
    let Some(ticket) = ticket else {
        return SearchOutcome::Ignored;
    };

    let location = geocoder.geocode(ticket.query()).await;
    handle.lock().await.complete_search(ticket, location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RankState;
    use crate::models::Coordinate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records whether the session was free while the lookup ran
    struct LockCheckingGeocoder {
        handle: SessionHandle,
        was_free: AtomicBool,
    }

    #[async_trait::async_trait]
    impl Geocoder for LockCheckingGeocoder {
        async fn geocode(&self, _query: &str) -> Option<Coordinate> {
            self.was_free.store(self.handle.try_lock().is_ok(), Ordering::SeqCst);
            Some(Coordinate::new(51.505, -0.09))
        }
    }

    fn create_store() -> SessionStore {
        SessionStore::new(
            Arc::new(Dataset::default()),
            SessionDefaults::default(),
            100,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = create_store();
        let (id, handle) = store.create().await;

        let fetched = store.get(&id).await.unwrap();
        assert!(Arc::ptr_eq(&handle, &fetched));
        assert_eq!(fetched.lock().await.rank_state(), RankState::Unranked);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = create_store();
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = create_store();
        let (id, _) = store.create().await;

        assert!(store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(!store.remove(&id).await);
    }

    #[tokio::test]
    async fn test_run_search_releases_lock_during_geocode() {
        let store = create_store();
        let (_, handle) = store.create().await;
        let geocoder = LockCheckingGeocoder {
            handle: handle.clone(),
            was_free: AtomicBool::new(false),
        };

        let outcome = run_search(&handle, &geocoder, "London").await;

        assert_eq!(outcome, SearchOutcome::Ranked);
        assert!(geocoder.was_free.load(Ordering::SeqCst));
        assert!(handle.lock().await.rank_state().is_ranked());
    }

    #[tokio::test]
    async fn test_run_search_ignores_blank_query() {
        let store = create_store();
        let (_, handle) = store.create().await;
        let geocoder = LockCheckingGeocoder {
            handle: handle.clone(),
            was_free: AtomicBool::new(false),
        };

        assert_eq!(run_search(&handle, &geocoder, "   ").await, SearchOutcome::Ignored);
        assert!(!geocoder.was_free.load(Ordering::SeqCst));
    }
}
