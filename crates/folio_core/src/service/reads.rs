//! Cached reads shared by the public site and the admin console.
//!
//! # Invariants
//! - Each [`QueryKey`] always caches the same data type, so both surfaces
//!   observe the same entries.

use crate::cache::{FetchError, QueryCache, QueryKey};
use crate::model::contact::{ContactInfo, Message};
use crate::model::profile::{About, Profile};
use crate::model::project::Project;
use crate::model::service::Service;
use crate::model::skill::CategoryWithSkills;
use crate::repo::Repositories;
use crate::store::{AuthProvider, User};
use log::warn;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct Reads {
    repos: Arc<Repositories>,
    auth: Arc<dyn AuthProvider>,
    cache: QueryCache,
}

macro_rules! cached_read {
    ($name:ident, $key:expr, $ty:ty, |$repos:ident| $call:expr) => {
        pub(crate) async fn $name(&self) -> Result<Arc<$ty>, FetchError> {
            let repos = Arc::clone(&self.repos);
            self.cache
                .fetch($key, move || {
                    let $repos = Arc::clone(&repos);
                    async move { $call.await }
                })
                .await
        }
    };
}

impl Reads {
    pub(crate) fn new(
        repos: Arc<Repositories>,
        auth: Arc<dyn AuthProvider>,
        cache: QueryCache,
    ) -> Self {
        Self { repos, auth, cache }
    }

    pub(crate) fn repos(&self) -> &Arc<Repositories> {
        &self.repos
    }

    pub(crate) fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    cached_read!(profile, QueryKey::Profile, Option<Profile>, |repos| repos.profile.get());
    cached_read!(about, QueryKey::About, Option<About>, |repos| repos.about.get());
    cached_read!(
        contact_info,
        QueryKey::ContactInfo,
        Vec<ContactInfo>,
        |repos| repos.contact_info.list()
    );
    cached_read!(messages, QueryKey::Messages, Vec<Message>, |repos| repos.messages.list());
    cached_read!(
        skills_with_categories,
        QueryKey::SkillsWithCategories,
        Vec<CategoryWithSkills>,
        |repos| repos.skills.list_with_categories()
    );
    cached_read!(projects, QueryKey::Projects, Vec<Project>, |repos| repos.projects.list());
    cached_read!(services, QueryKey::Services, Vec<Service>, |repos| repos.services.list());

    pub(crate) async fn current_user(&self) -> Result<Arc<Option<User>>, FetchError> {
        let auth = Arc::clone(&self.auth);
        self.cache
            .fetch(QueryKey::Auth, move || {
                let auth = Arc::clone(&auth);
                async move { auth.current_user().await }
            })
            .await
    }

    /// The fresh value, or the last good one when the refresh failed.
    pub(crate) fn or_last_good<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        result: Result<Arc<T>, FetchError>,
    ) -> Option<Arc<T>> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("event=section_load module=service status=error key={key} error={err}");
                self.cache.peek::<T>(key).and_then(|snapshot| snapshot.data)
            }
        }
    }
}
