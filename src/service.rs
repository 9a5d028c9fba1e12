//! Poem-of-the-day service
//!
//! Ties the daily cache to a remote poem source and keeps the state a UI needs:
//! the current poem, whether an operation is in flight, and the last error.

use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use crate::cache::DailyCache;
use crate::poetry::{Poem, PoetrySource};

/// Shown when a failure carries no description of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "获取诗词失败，请稍后重试";

/// Where the current poem came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoemOrigin {
    /// Read from today's cache entry
    Cache,
    /// Fetched from the remote source
    Network,
}

/// Observable state of the service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoetryState {
    /// Last poem successfully obtained
    pub content: Option<Poem>,
    /// True while a load or refresh is in flight
    pub is_loading: bool,
    /// Description of the last failure, cleared when an operation starts
    pub error_message: Option<String>,
    /// Where `content` came from
    pub origin: Option<PoemOrigin>,
}

/// Loads the poem of the day, from cache when possible
///
/// Both operations take `&self`, so the service can be shared (e.g. behind an
/// `Arc`) and operations may overlap. Overlapping operations are not queued:
/// whichever finishes last determines the final state.
pub struct PoetryService {
    cache: DailyCache,
    source: Arc<dyn PoetrySource>,
    state: RwLock<PoetryState>,
}

/// Clears the loading flag when an operation ends, however it ends
struct LoadingGuard<'a> {
    state: &'a RwLock<PoetryState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.is_loading = false;
    }
}

impl PoetryService {
    pub fn new(cache: DailyCache, source: impl PoetrySource + 'static) -> Self {
        Self::with_shared_source(cache, Arc::new(source))
    }

    pub fn with_shared_source(cache: DailyCache, source: Arc<dyn PoetrySource>) -> Self {
        Self {
            cache,
            source,
            state: RwLock::new(PoetryState::default()),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PoetryState {
        self.read_state().clone()
    }

    pub fn content(&self) -> Option<Poem> {
        self.read_state().content.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.read_state().error_message.clone()
    }

    pub fn origin(&self) -> Option<PoemOrigin> {
        self.read_state().origin
    }

    /// Loads today's poem, using the cache when it holds one for today
    pub async fn load(&self) {
        self.run(true).await
    }

    /// Fetches a new poem regardless of the cache
    pub async fn refresh(&self) {
        self.run(false).await
    }

    async fn run(&self, use_cache: bool) {
        self.update(|state| {
            state.is_loading = true;
            state.error_message = None;
        });
        let _guard = LoadingGuard { state: &self.state };

        if use_cache {
            if let Some(poem) = self.cache.read() {
                info!("using cached poem");
                self.update(|state| {
                    state.content = Some(poem);
                    state.origin = Some(PoemOrigin::Cache);
                });
                return;
            }
        }

        match self.source.fetch_poem().await {
            Ok(poem) => {
                info!("fetched new poem");
                self.cache.write(&poem);
                self.update(|state| {
                    state.content = Some(poem);
                    state.origin = Some(PoemOrigin::Network);
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch poem");
                let message = user_message(&e);
                self.update(|state| state.error_message = Some(message));
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, PoetryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut PoetryState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

/// Turns a failure into the text shown to the user
fn user_message(error: &impl Display) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{today, KeyValueStore, MemoryStore, CACHE_KEY};
    use crate::poetry::FetchError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Source that replays canned results and counts calls
    struct StubSource {
        responses: Mutex<VecDeque<Result<Poem, FetchError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn new(responses: Vec<Result<Poem, FetchError>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                responses: Mutex::new(responses.into()),
                calls: calls.clone(),
            };
            (source, calls)
        }
    }

    #[async_trait]
    impl PoetrySource for StubSource {
        async fn fetch_poem(&self) -> Result<Poem, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Transport { status: 599 }))
        }
    }

    /// Source whose n-th call resolves after the n-th delay
    struct DelayedSource {
        calls: AtomicUsize,
        plan: Vec<(u64, &'static str)>,
    }

    #[async_trait]
    impl PoetrySource for DelayedSource {
        async fn fetch_poem(&self) -> Result<Poem, FetchError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay_ms, text) = self.plan[index];
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(poem(text))
        }
    }

    /// Source that never answers
    struct PendingSource;

    #[async_trait]
    impl PoetrySource for PendingSource {
        async fn fetch_poem(&self) -> Result<Poem, FetchError> {
            futures::future::pending().await
        }
    }

    fn poem(text: &str) -> Poem {
        Poem::new(json!({ "text": text }))
    }

    fn service_with(
        responses: Vec<Result<Poem, FetchError>>,
    ) -> (PoetryService, Arc<MemoryStore>, Arc<AtomicUsize>) {
        let store = Arc::new(MemoryStore::new());
        let cache = DailyCache::from_shared(store.clone());
        let (source, calls) = StubSource::new(responses);
        (PoetryService::new(cache, source), store, calls)
    }

    #[test]
    fn test_initial_state_is_empty() {
        let (service, _store, _calls) = service_with(vec![]);
        assert_eq!(service.state(), PoetryState::default());
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_load_fetches_and_caches_on_empty_store() {
        let (service, store, calls) = service_with(vec![Ok(poem("春眠不觉晓"))]);

        service.load().await;

        assert_eq!(service.content(), Some(poem("春眠不觉晓")));
        assert_eq!(service.origin(), Some(PoemOrigin::Network));
        assert!(service.error_message().is_none());
        assert!(!service.is_loading());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let raw = store.get(CACHE_KEY).unwrap().expect("record should be cached");
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["date"], today().format("%Y-%m-%d").to_string());
        assert_eq!(record["poetry"], json!({"text": "春眠不觉晓"}));
    }

    #[tokio::test]
    async fn test_load_uses_todays_cache_without_fetching() {
        let (service, store, calls) = service_with(vec![Ok(poem("network"))]);
        DailyCache::from_shared(store.clone()).write(&poem("cached"));

        service.load().await;

        assert_eq!(service.content(), Some(poem("cached")));
        assert_eq!(service.origin(), Some(PoemOrigin::Cache));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_load_ignores_stale_cache() {
        let (service, store, calls) = service_with(vec![Ok(poem("fresh"))]);
        store
            .set(CACHE_KEY, r#"{"date":"2099-01-01","poetry":{"text":"old"}}"#)
            .unwrap();

        service.load().await;

        assert_eq!(service.content(), Some(poem("fresh")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_treats_malformed_cache_as_miss() {
        let (service, store, calls) = service_with(vec![Ok(poem("fresh"))]);
        store.set(CACHE_KEY, "garbage").unwrap();

        service.load().await;

        assert_eq!(service.content(), Some(poem("fresh")));
        assert!(service.error_message().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_failure_sets_error_and_keeps_content_empty() {
        let (service, _store, _calls) =
            service_with(vec![Err(FetchError::Transport { status: 500 })]);

        service.load().await;

        assert!(service.content().is_none());
        assert_eq!(
            service.error_message().as_deref(),
            Some("HTTP error! status: 500")
        );
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let (service, store, calls) = service_with(vec![Ok(poem("new"))]);
        let cache = DailyCache::from_shared(store.clone());
        cache.write(&poem("cached"));

        service.refresh().await;

        assert_eq!(service.content(), Some(poem("new")));
        assert_eq!(service.origin(), Some(PoemOrigin::Network));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.read(), Some(poem("new")));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_content() {
        let (service, _store, _calls) = service_with(vec![
            Ok(poem("first")),
            Err(FetchError::InvalidResponse {
                reason: "status \"error\"".to_string(),
            }),
        ]);

        service.load().await;
        let before = service.content();
        service.refresh().await;

        assert_eq!(service.content(), before);
        assert_eq!(service.origin(), Some(PoemOrigin::Network));
        let message = service.error_message().expect("error should be set");
        assert!(message.contains("Invalid API response"));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_successful_refresh_clears_previous_error() {
        let (service, _store, _calls) = service_with(vec![
            Err(FetchError::Transport { status: 503 }),
            Ok(poem("recovered")),
        ]);

        service.load().await;
        assert!(service.error_message().is_some());

        service.refresh().await;

        assert!(service.error_message().is_none());
        assert_eq!(service.content(), Some(poem("recovered")));
    }

    #[tokio::test]
    async fn test_loading_flag_set_while_in_flight_and_cleared_on_drop() {
        let cache = DailyCache::new(MemoryStore::new());
        let service = PoetryService::new(cache, PendingSource);

        let mut fut = Box::pin(service.refresh());
        assert!(futures::poll!(&mut fut).is_pending());
        assert!(service.is_loading());

        drop(fut);

        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_last_to_finish_wins() {
        let cache = DailyCache::new(MemoryStore::new());
        let source = DelayedSource {
            calls: AtomicUsize::new(0),
            plan: vec![(60, "slow"), (5, "fast")],
        };
        let service = PoetryService::new(cache, source);

        tokio::join!(service.refresh(), service.refresh());

        assert_eq!(service.content(), Some(poem("slow")));
        assert!(!service.is_loading());
    }

    #[test]
    fn test_user_message_falls_back_when_empty() {
        struct Silent;
        impl Display for Silent {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Ok(())
            }
        }

        assert_eq!(user_message(&Silent), FALLBACK_ERROR_MESSAGE);
        assert_eq!(user_message(&"boom"), "boom");
    }
}
