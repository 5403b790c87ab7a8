//! Composition root.
//!
//! # Responsibility
//! - Build the store, repositories, query cache and mutation coordinator
//!   once, and hand out the public and admin surfaces over them.
//!
//! # Invariants
//! - All surfaces handed out by one `Portfolio` share one cache, so a write
//!   through the admin console refreshes what the public site shows.

use crate::cache::{CacheConfig, QueryCache};
use crate::config::{BackendConfig, PortfolioConfig};
use crate::model::defaults::DefaultContent;
use crate::mutation::MutationCoordinator;
use crate::repo::Repositories;
use crate::service::admin_console::AdminConsole;
use crate::service::contact_form::ContactForm;
use crate::service::public_site::PublicSite;
use crate::service::reads::Reads;
use crate::store::local::LocalStore;
use crate::store::rest::RestStore;
use crate::store::{Backend, StoreResult};
use log::info;
use reqwest::Client;
use std::sync::Arc;

pub struct Portfolio {
    reads: Reads,
    cache: QueryCache,
    mutations: MutationCoordinator,
    defaults: Arc<DefaultContent>,
}

impl Portfolio {
    /// Wires everything over an already-built backend.
    pub fn with_backend<B: Backend + 'static>(
        backend: Arc<B>,
        cache: CacheConfig,
        defaults: DefaultContent,
    ) -> Self {
        let cache = QueryCache::new(cache);
        let repos = Arc::new(Repositories::new(backend.clone()));
        Self {
            reads: Reads::new(repos, backend, cache.clone()),
            mutations: MutationCoordinator::new(cache.clone()),
            cache,
            defaults: Arc::new(defaults),
        }
    }

    /// Opens the configured backend and wires everything over it.
    pub fn from_config(config: &PortfolioConfig) -> StoreResult<Self> {
        let defaults = DefaultContent::default();
        match &config.backend {
            BackendConfig::Remote {
                url,
                anon_key,
                timeout,
            } => {
                let store = match timeout {
                    Some(timeout) => RestStore::new(url, anon_key, *timeout)?,
                    None => RestStore::with_client(Client::new(), url, anon_key),
                };
                info!("event=portfolio_open module=service status=ok backend=rest");
                Ok(Self::with_backend(Arc::new(store), config.cache, defaults))
            }
            BackendConfig::Local { db_path, admin } => {
                let store = match db_path {
                    Some(path) => LocalStore::open(path)?,
                    None => LocalStore::in_memory()?,
                };
                if let Some((email, password)) = admin {
                    store.register_admin(email, password);
                }
                info!(
                    "event=portfolio_open module=service status=ok backend=local persistent={}",
                    db_path.is_some()
                );
                Ok(Self::with_backend(Arc::new(store), config.cache, defaults))
            }
        }
    }

    pub fn public_site(&self) -> PublicSite {
        PublicSite::new(
            self.reads.clone(),
            self.mutations.clone(),
            Arc::clone(&self.defaults),
        )
    }

    pub fn contact_form(&self) -> ContactForm {
        ContactForm::new(self.public_site())
    }

    pub fn admin(&self) -> AdminConsole {
        AdminConsole::new(self.reads.clone(), self.mutations.clone())
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }
}
