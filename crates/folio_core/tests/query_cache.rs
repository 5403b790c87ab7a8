use folio_core::cache::{CacheError, QueryCache, QueryKey, QueryStatus};
use folio_core::CacheConfig;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Fetcher that returns its 1-based call number, optionally waiting on a gate.
fn counting_fetcher(
    calls: &Arc<AtomicUsize>,
    gate: Option<&Arc<Semaphore>>,
) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<usize, CacheError>> + Send>>
       + Send
       + Sync
       + 'static {
    let calls = Arc::clone(calls);
    let gate = gate.map(Arc::clone);
    move || {
        let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                let permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|_| CacheError::Closed(QueryKey::Projects))?;
                permit.forget();
            }
            Ok(call)
        })
    }
}

#[tokio::test]
async fn concurrent_observers_share_one_fetch() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Semaphore::new(0));

    let mut first = cache.subscribe(QueryKey::Projects, counting_fetcher(&calls, Some(&gate)));
    let mut second = cache.subscribe(QueryKey::Projects, counting_fetcher(&calls, Some(&gate)));
    assert_eq!(first.current().status, QueryStatus::Loading);
    assert!(second.current().is_fetching);

    gate.add_permits(1);
    let (left, right) = tokio::join!(first.settled(), second.settled());
    assert_eq!(*left.unwrap(), 1);
    assert_eq!(*right.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidation_serves_last_value_while_refreshing() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut observer = cache.subscribe(QueryKey::Services, counting_fetcher(&calls, None));
    assert_eq!(*observer.settled().await.unwrap(), 1);

    cache.invalidate(QueryKey::Services);
    let snapshot = observer.current();
    assert_eq!(snapshot.status, QueryStatus::Loading);
    assert!(snapshot.is_fetching);
    assert_eq!(snapshot.data.as_deref(), Some(&1));

    assert_eq!(*observer.settled().await.unwrap(), 2);
    assert_eq!(observer.current().status, QueryStatus::Resolved);
}

#[tokio::test]
async fn invalidation_during_fetch_triggers_exactly_one_follow_up() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Semaphore::new(0));
    let mut observer = cache.subscribe(QueryKey::Profile, counting_fetcher(&calls, Some(&gate)));

    cache.invalidate(QueryKey::Profile);
    cache.invalidate(QueryKey::Profile);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    gate.add_permits(2);
    assert_eq!(*observer.settled().await.unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidating_unobserved_key_defers_refetch_to_next_read() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let value = cache
        .fetch(QueryKey::Messages, counting_fetcher(&calls, None))
        .await
        .unwrap();
    assert_eq!(*value, 1);

    cache.invalidate(QueryKey::Messages);
    tokio::task::yield_now().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let snapshot = cache.peek::<usize>(QueryKey::Messages).unwrap();
    assert_eq!(snapshot.status, QueryStatus::Resolved);

    let value = cache
        .fetch(QueryKey::Messages, counting_fetcher(&calls, None))
        .await
        .unwrap();
    assert_eq!(*value, 2);
}

#[tokio::test(start_paused = true)]
async fn fresh_values_are_served_without_refetch_until_stale() {
    let cache = QueryCache::new(CacheConfig {
        stale_time: Duration::from_secs(60),
    });
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let value = cache
            .fetch(QueryKey::About, counting_fetcher(&calls, None))
            .await
            .unwrap();
        assert_eq!(*value, 1);
    }

    tokio::time::advance(Duration::from_secs(61)).await;
    let value = cache
        .fetch(QueryKey::About, counting_fetcher(&calls, None))
        .await
        .unwrap();
    assert_eq!(*value, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidate_all_refreshes_every_observed_key() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut projects = cache.subscribe(QueryKey::Projects, counting_fetcher(&calls, None));
    let mut services = cache.subscribe(QueryKey::Services, counting_fetcher(&calls, None));
    projects.settled().await.unwrap();
    services.settled().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cache.invalidate_all();
    projects.settled().await.unwrap();
    services.settled().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn observer_with_wrong_type_reports_mismatch() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    cache
        .fetch(QueryKey::Projects, counting_fetcher(&calls, None))
        .await
        .unwrap();

    let snapshot = cache.peek::<String>(QueryKey::Projects).unwrap();
    assert_eq!(snapshot.status, QueryStatus::Resolved);
    assert!(snapshot.data.is_none());
}
