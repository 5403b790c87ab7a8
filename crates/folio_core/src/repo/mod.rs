//! Entity repositories over the store boundary.
//!
//! # Responsibility
//! - Expose typed CRUD per entity on top of one generic table primitive.
//! - Map store responses to records and store failures to [`RepoError`].
//!
//! # Invariants
//! - Every repository call issues exactly one store request, except the
//!   singleton upsert (probe, then write).
//! - Writes validate their payload before any request.
//! - Singleton absence is `Ok(None)`, never an error.

mod entity;
mod error;
mod message_repo;
mod singleton_repo;
mod skill_repo;
mod table_repo;

pub use entity::{Editable, Entity};
pub use error::{RepoError, RepoResult};
pub use message_repo::MessageRepository;
pub use singleton_repo::SingletonRepository;
pub use skill_repo::SkillRepository;
pub use table_repo::TableRepository;

use crate::model::contact::ContactInfo;
use crate::model::profile::{About, Profile};
use crate::model::project::Project;
use crate::model::service::Service;
use crate::store::DataStore;
use std::sync::Arc;

/// One repository per entity, sharing a single store.
pub struct Repositories {
    pub profile: SingletonRepository<Profile>,
    pub about: SingletonRepository<About>,
    pub contact_info: TableRepository<ContactInfo>,
    pub messages: MessageRepository,
    pub skills: SkillRepository,
    pub projects: TableRepository<Project>,
    pub services: TableRepository<Service>,
}

impl Repositories {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            profile: SingletonRepository::new(Arc::clone(&store)),
            about: SingletonRepository::new(Arc::clone(&store)),
            contact_info: TableRepository::new(Arc::clone(&store)),
            messages: MessageRepository::new(Arc::clone(&store)),
            skills: SkillRepository::new(Arc::clone(&store)),
            projects: TableRepository::new(Arc::clone(&store)),
            services: TableRepository::new(store),
        }
    }
}
