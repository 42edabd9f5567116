//! In-memory query cache with a freshness window and explicit invalidation.
//!
//! The slot's lock is held while a fetch is in flight, so concurrent readers of a cold
//! or stale entry wait for that one fetch instead of issuing their own. Failed fetches
//! are never stored.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

/// One cached query result.
#[derive(Debug)]
pub struct QueryCache<T> {
    name: &'static str,
    /// `None` keeps the value until it is invalidated.
    ttl: Option<Duration>,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> QueryCache<T> {
    /// A cache whose entries go stale after `ttl`.
    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl: Some(ttl),
            slot: Mutex::new(None),
        }
    }

    /// A cache whose entries stay fresh until invalidated.
    pub fn until_invalidated(name: &'static str) -> Self {
        Self {
            name,
            ttl: None,
            slot: Mutex::new(None),
        }
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        self.ttl.map_or(true, |ttl| entry.fetched_at.elapsed() < ttl)
    }

    /// Return the fresh cached value, or run `fetch` and cache its success.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if self.is_fresh(entry) {
                tracing::debug!(cache = self.name, "cache hit");
                return Ok(entry.value.clone());
            }
            tracing::debug!(cache = self.name, "cache entry is stale");
        } else {
            tracing::debug!(cache = self.name, "cache miss");
        }

        let value = fetch().await?;
        *slot = Some(Entry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drop the cached value so the next read refetches.
    ///
    /// Waits for an in-flight fetch, so a value fetched before the invalidation
    /// is never left behind as fresh.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::debug!(cache = self.name, "cache invalidated");
        }
    }

    /// The cached value, fresh or not, without fetching.
    pub async fn peek(&self) -> Option<T> {
        self.slot.lock().await.as_ref().map(|entry| entry.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn counted(counter: &AtomicUsize) -> Result<Vec<String>, String> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec![format!("fetch-{n}")])
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entries_are_reused() {
        let cache = QueryCache::with_ttl("kinds", Duration::from_secs(3600));
        let fetches = AtomicUsize::new(0);

        let first = cache.get_or_fetch(|| counted(&fetches)).await.unwrap();
        tokio::time::advance(Duration::from_secs(3599)).await;
        let second = cache.get_or_fetch(|| counted(&fetches)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entries_are_refetched() {
        let cache = QueryCache::with_ttl("kinds", Duration::from_secs(3600));
        let fetches = AtomicUsize::new(0);

        cache.get_or_fetch(|| counted(&fetches)).await.unwrap();
        tokio::time::advance(Duration::from_secs(3601)).await;
        let value = cache.get_or_fetch(|| counted(&fetches)).await.unwrap();

        assert_eq!(value, vec!["fetch-2".to_string()]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::until_invalidated("promotions");
        let fetches = AtomicUsize::new(0);

        cache.get_or_fetch(|| counted(&fetches)).await.unwrap();
        cache.get_or_fetch(|| counted(&fetches)).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        assert!(cache.peek().await.is_none());
        cache.get_or_fetch(|| counted(&fetches)).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache: QueryCache<Vec<String>> = QueryCache::until_invalidated("promotions");

        let err = cache
            .get_or_fetch(|| async { Err::<Vec<String>, _>("offline") })
            .await
            .unwrap_err();
        assert_eq!(err, "offline");
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let cache = Arc::new(QueryCache::with_ttl("kinds", Duration::from_secs(3600)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let fetches = Arc::clone(&fetches);
                tokio::spawn(async move {
                    cache
                        .get_or_fetch(|| async {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            counted(&fetches).await
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), vec!["fetch-1".to_string()]);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
