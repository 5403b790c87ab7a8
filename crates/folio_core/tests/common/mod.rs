#![allow(dead_code)]

use async_trait::async_trait;
use folio_core::model::contact::{ContactInfoFields, ContactKind};
use folio_core::model::project::ProjectFields;
use folio_core::store::{
    AuthProvider, DataStore, Row, RowId, SelectQuery, Session, StoreError, StoreResult, Table,
    User,
};
use folio_core::{CacheConfig, DefaultContent, Icon, LocalStore, Portfolio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// Embedded store that counts requests and can be switched offline.
pub struct CountingStore {
    inner: LocalStore,
    selects: AtomicUsize,
    writes: AtomicUsize,
    offline: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        let inner = LocalStore::in_memory().unwrap();
        inner.register_admin(ADMIN_EMAIL, ADMIN_PASSWORD);
        Arc::new(Self {
            inner,
            selects: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        })
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for CountingStore {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.inner.select(query).await
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: RowId, patch: Row) -> StoreResult<Row> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: RowId) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.inner.delete(table, id).await
    }
}

#[async_trait]
impl AuthProvider for CountingStore {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        self.inner.sign_in(email, password).await
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.inner.sign_out().await
    }

    async fn current_user(&self) -> StoreResult<Option<User>> {
        self.inner.current_user().await
    }
}

pub fn portfolio(store: &Arc<CountingStore>) -> Portfolio {
    Portfolio::with_backend(
        Arc::clone(store),
        CacheConfig::default(),
        DefaultContent::default(),
    )
}

/// Store with an admin session already open.
pub async fn signed_in_store() -> Arc<CountingStore> {
    let store = CountingStore::new();
    store.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    store
}

pub fn project(title: &str, order_index: i32) -> ProjectFields {
    ProjectFields {
        title: title.to_string(),
        description: format!("{title} description"),
        technologies: vec!["Rust".to_string(), "SQLite".to_string()],
        image_url: None,
        github_url: Some(format!("https://github.com/example/{title}")),
        live_url: None,
        featured: false,
        order_index,
    }
}

pub fn contact(kind: ContactKind, icon: Icon, label: &str, order_index: i32) -> ContactInfoFields {
    ContactInfoFields {
        kind,
        label: label.to_string(),
        value: format!("{label} value"),
        href: "#".to_string(),
        icon,
        order_index,
    }
}
