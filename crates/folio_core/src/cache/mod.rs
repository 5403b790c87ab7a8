//! Keyed query cache with request deduplication and stale-while-revalidate.
//!
//! # Responsibility
//! - Hold the last result of every read keyed by [`QueryKey`].
//! - Run at most one fetch per key and share it across observers.
//! - Re-run reads on invalidation while observers keep the last value.
//!
//! # Invariants
//! - Per key: `Empty -> Loading -> Resolved | Failed`; invalidation moves a
//!   settled key back to `Loading` without clearing its data.
//! - At most one fetch per key is in flight at any time.
//! - An invalidation that lands while a fetch is in flight is never lost:
//!   the running fetch publishes its result, then exactly one follow-up
//!   fetch starts.
//! - A failed fetch keeps the last resolved data.

mod observer;

pub use observer::{QueryObserver, QuerySnapshot};

use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, warn};
use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

/// Failure surfaced to cache observers.
pub type FetchError = Arc<dyn Error + Send + Sync>;

type AnyData = Arc<dyn Any + Send + Sync>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<AnyData, FetchError>> + Send + Sync>;

/// The fixed set of reads the site performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    Auth,
    Profile,
    About,
    ContactInfo,
    Messages,
    SkillsWithCategories,
    Projects,
    Services,
}

impl QueryKey {
    pub const ALL: [QueryKey; 8] = [
        QueryKey::Auth,
        QueryKey::Profile,
        QueryKey::About,
        QueryKey::ContactInfo,
        QueryKey::Messages,
        QueryKey::SkillsWithCategories,
        QueryKey::Projects,
        QueryKey::Services,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Profile => "profile",
            Self::About => "about",
            Self::ContactInfo => "contact-info",
            Self::Messages => "messages",
            Self::SkillsWithCategories => "skills-with-categories",
            Self::Projects => "projects",
            Self::Services => "services",
        }
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Empty,
    Loading,
    Resolved,
    Failed,
}

/// Cache-level failures, reported through [`FetchError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A fetch was requested outside a tokio runtime.
    NoRuntime(QueryKey),
    /// The key holds data of a different type than the observer expects.
    TypeMismatch(QueryKey),
    /// The cache was dropped while an observer waited.
    Closed(QueryKey),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime(key) => write!(f, "query `{key}` needs a tokio runtime to fetch"),
            Self::TypeMismatch(key) => write!(f, "query `{key}` holds a different data type"),
            Self::Closed(key) => write!(f, "query cache closed while awaiting `{key}`"),
        }
    }
}

impl Error for CacheError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a resolved value counts as fresh. Fresh values are served
    /// without a background refresh when a new observer subscribes.
    pub stale_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
        }
    }
}

/// Type-erased state published to observers.
#[derive(Clone)]
pub(crate) struct RawSnapshot {
    pub(crate) status: QueryStatus,
    pub(crate) data: Option<AnyData>,
    pub(crate) error: Option<FetchError>,
    pub(crate) is_fetching: bool,
}

impl RawSnapshot {
    fn empty() -> Self {
        Self {
            status: QueryStatus::Empty,
            data: None,
            error: None,
            is_fetching: false,
        }
    }
}

struct Entry {
    tx: watch::Sender<RawSnapshot>,
    fetcher: Option<Fetcher>,
    in_flight: bool,
    refetch_requested: bool,
    invalidated: bool,
    resolved_at: Option<Instant>,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(RawSnapshot::empty());
        Self {
            tx,
            fetcher: None,
            in_flight: false,
            refetch_requested: false,
            invalidated: false,
            resolved_at: None,
        }
    }

    fn status(&self) -> QueryStatus {
        self.tx.borrow().status
    }

    fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated
            || self
                .resolved_at
                .map_or(true, |resolved_at| resolved_at.elapsed() >= stale_time)
    }

    /// Marks the key as fetching and hands out the fetcher to run.
    fn begin(&mut self) -> Option<Fetcher> {
        if self.in_flight {
            return None;
        }
        let fetcher = self.fetcher.clone()?;
        self.in_flight = true;
        self.invalidated = false;
        self.tx.send_modify(|snapshot| {
            snapshot.status = QueryStatus::Loading;
            snapshot.is_fetching = true;
        });
        Some(fetcher)
    }
}

struct Inner {
    config: CacheConfig,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

/// Shared handle to one cache instance.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches an observer to `key`, starting a fetch when the key is empty
    /// or stale and none is already running.
    ///
    /// Must be called inside a tokio runtime; fetches run as spawned tasks.
    pub fn subscribe<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryObserver<T>
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let erased: Fetcher = Arc::new(move || {
            let fut = fetcher();
            async move {
                fut.await
                    .map(|value| Arc::new(value) as AnyData)
                    .map_err(|err| Arc::new(err) as FetchError)
            }
            .boxed()
        });

        let stale_time = self.inner.config.stale_time;
        let (rx, started) = {
            let mut entries = self.entries();
            let entry = entries.entry(key).or_insert_with(Entry::new);
            entry.fetcher = Some(erased);
            let needs_fetch = match entry.status() {
                QueryStatus::Empty => true,
                QueryStatus::Loading => false,
                QueryStatus::Resolved | QueryStatus::Failed => entry.is_stale(stale_time),
            };
            let started = if needs_fetch { entry.begin() } else { None };
            (entry.tx.subscribe(), started)
        };

        if let Some(fetcher) = started {
            self.spawn_fetch(key, fetcher);
        }
        QueryObserver::new(key, rx)
    }

    /// Subscribes and waits for the key to settle.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, FetchError>
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.subscribe(key, fetcher).settled().await
    }

    /// Current state of `key` without subscribing or fetching.
    pub fn peek<T: Send + Sync + 'static>(&self, key: QueryKey) -> Option<QuerySnapshot<T>> {
        let entries = self.entries();
        let entry = entries.get(&key)?;
        let raw = entry.tx.borrow();
        Some(QuerySnapshot::from_raw(&raw))
    }

    /// Marks `key` stale and refetches it when it has observers.
    pub fn invalidate(&self, key: QueryKey) {
        let started = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };
            entry.invalidated = true;
            if entry.in_flight {
                entry.refetch_requested = true;
                None
            } else if entry.tx.receiver_count() > 0 {
                entry.begin()
            } else {
                None
            }
        };
        debug!("event=query_invalidate module=cache status=ok key={key}");
        if let Some(fetcher) = started {
            self.spawn_fetch(key, fetcher);
        }
    }

    pub fn invalidate_all(&self) {
        for key in QueryKey::ALL {
            self.invalidate(key);
        }
    }

    fn spawn_fetch(&self, key: QueryKey, fetcher: Fetcher) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("event=query_fetch module=cache status=error key={key} reason=no_runtime");
                self.complete(key, Err(Arc::new(CacheError::NoRuntime(key))));
                return;
            }
        };

        let cache = self.clone();
        handle.spawn(async move {
            let started_at = Instant::now();
            debug!("event=query_fetch module=cache status=start key={key}");
            let result = fetcher().await;
            match &result {
                Ok(_) => debug!(
                    "event=query_fetch module=cache status=ok key={key} duration_ms={}",
                    started_at.elapsed().as_millis()
                ),
                Err(err) => warn!(
                    "event=query_fetch module=cache status=error key={key} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                ),
            }
            cache.complete(key, result);
        });
    }

    fn complete(&self, key: QueryKey, result: Result<AnyData, FetchError>) {
        let follow_up = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };
            entry.in_flight = false;
            match result {
                Ok(data) => {
                    entry.resolved_at = Some(Instant::now());
                    entry.tx.send_modify(|snapshot| {
                        snapshot.status = QueryStatus::Resolved;
                        snapshot.data = Some(data);
                        snapshot.error = None;
                        snapshot.is_fetching = false;
                    });
                }
                Err(err) => {
                    entry.tx.send_modify(|snapshot| {
                        snapshot.status = QueryStatus::Failed;
                        snapshot.error = Some(err);
                        snapshot.is_fetching = false;
                    });
                }
            }
            if entry.refetch_requested {
                entry.refetch_requested = false;
                entry.begin()
            } else {
                None
            }
        };
        if let Some(fetcher) = follow_up {
            debug!("event=query_refetch module=cache status=start key={key}");
            self.spawn_fetch(key, fetcher);
        }
    }
}
