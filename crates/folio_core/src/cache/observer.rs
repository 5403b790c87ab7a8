use super::{CacheError, FetchError, QueryKey, QueryStatus, RawSnapshot};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::watch;

/// Typed view of one cache key at a point in time.
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    /// Last resolved value; kept while a refresh runs or after it fails.
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    pub is_fetching: bool,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
        }
    }
}

impl<T: Send + Sync + 'static> QuerySnapshot<T> {
    pub(crate) fn from_raw(raw: &RawSnapshot) -> Self {
        Self {
            status: raw.status,
            data: raw
                .data
                .clone()
                .and_then(|data| data.downcast::<T>().ok()),
            error: raw.error.clone(),
            is_fetching: raw.is_fetching,
        }
    }
}

/// Subscription to one cache key.
pub struct QueryObserver<T> {
    key: QueryKey,
    rx: watch::Receiver<RawSnapshot>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub(crate) fn new(key: QueryKey, rx: watch::Receiver<RawSnapshot>) -> Self {
        Self {
            key,
            rx,
            marker: PhantomData,
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn current(&self) -> QuerySnapshot<T> {
        QuerySnapshot::from_raw(&self.rx.borrow())
    }

    /// Waits for the next published state; `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<QuerySnapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(QuerySnapshot::from_raw(&self.rx.borrow_and_update()))
    }

    /// Waits until no fetch is running, then returns the value or the error.
    pub async fn settled(&mut self) -> Result<Arc<T>, FetchError> {
        loop {
            let raw = self.rx.borrow_and_update().clone();
            if !raw.is_fetching {
                match raw.status {
                    QueryStatus::Resolved => {
                        return raw
                            .data
                            .and_then(|data| data.downcast::<T>().ok())
                            .ok_or_else(|| {
                                Arc::new(CacheError::TypeMismatch(self.key)) as FetchError
                            });
                    }
                    QueryStatus::Failed => {
                        return Err(raw.error.unwrap_or_else(|| {
                            Arc::new(CacheError::Closed(self.key)) as FetchError
                        }));
                    }
                    QueryStatus::Empty | QueryStatus::Loading => {}
                }
            }
            if self.rx.changed().await.is_err() {
                return Err(Arc::new(CacheError::Closed(self.key)));
            }
        }
    }
}
