//! Data-access layer of the portfolio site.
//! Typed repositories over a hosted or embedded store, a keyed query cache,
//! and the write coordinator that keeps the two consistent.

pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod repo;
pub mod service;
pub mod store;

pub use cache::{CacheConfig, QueryCache, QueryKey, QueryStatus};
pub use config::{BackendConfig, ConfigError, PortfolioConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::defaults::DefaultContent;
pub use model::icon::Icon;
pub use model::validate::{Validate, ValidationError};
pub use mutation::{MutationCoordinator, MutationKind, MutationOp, MutationStatus};
pub use repo::{RepoError, RepoResult, Repositories};
pub use service::{
    AdminConsole, AdminError, ContactForm, Notice, PageContent, Portfolio, PublicSite, Section,
    SectionSource,
};
pub use store::local::LocalStore;
pub use store::rest::RestStore;
pub use store::{AuthProvider, DataStore, StoreError, StoreResult, Table};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
