//! Password-gated admin surface.
//!
//! # Responsibility
//! - Sign the admin in and out, and report the current user.
//! - Expose every content read and write behind the session check.
//!
//! # Invariants
//! - Every operation except `sign_in`/`current_user` fails with
//!   [`AdminError::Unauthenticated`] before touching data when no user is
//!   signed in.
//! - All writes run through the mutation coordinator, so dependent cache
//!   keys are invalidated on success and untouched on failure.

use crate::cache::FetchError;
use crate::model::contact::{ContactInfo, ContactInfoFields, ContactInfoPatch, Message};
use crate::model::profile::{About, AboutPatch, Profile, ProfilePatch};
use crate::model::project::{Project, ProjectFields, ProjectPatch};
use crate::model::service::{Service, ServiceFields, ServicePatch};
use crate::model::skill::{
    CategoryWithSkills, Skill, SkillCategory, SkillCategoryFields, SkillCategoryPatch,
    SkillFields, SkillPatch,
};
use crate::mutation::{MutationCoordinator, MutationKind, MutationOp};
use crate::repo::{RepoError, RepoResult};
use crate::service::reads::Reads;
use crate::store::{RowId, StoreError, Table, User};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug)]
pub enum AdminError {
    /// No signed-in user.
    Unauthenticated,
    /// Sign-in or sign-out was rejected.
    Auth(StoreError),
    /// A cached read failed.
    Read(FetchError),
    Repo(RepoError),
}

impl AdminError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "sign in required"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Read(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unauthenticated => None,
            Self::Auth(err) => Some(err),
            Self::Read(err) => Some(&**err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AdminError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

fn kind(table: Table, op: MutationOp) -> MutationKind {
    MutationKind::table(table, op)
}

fn next_order_index(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

#[derive(Clone)]
pub struct AdminConsole {
    reads: Reads,
    mutations: MutationCoordinator,
}

impl AdminConsole {
    pub(crate) fn new(reads: Reads, mutations: MutationCoordinator) -> Self {
        Self { reads, mutations }
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AdminError> {
        let auth = self.reads.auth();
        let session = self
            .mutations
            .run(
                MutationKind::session(MutationOp::SignIn),
                auth.sign_in(email, password),
            )
            .await
            .map_err(AdminError::Auth)?;
        Ok(session.user)
    }

    pub async fn sign_out(&self) -> Result<(), AdminError> {
        let auth = self.reads.auth();
        self.mutations
            .run(MutationKind::session(MutationOp::SignOut), auth.sign_out())
            .await
            .map_err(AdminError::Auth)
    }

    /// Signed-in user, `None` when the admin surface should show the login.
    pub async fn current_user(&self) -> Result<Option<User>, AdminError> {
        let user = self
            .reads
            .current_user()
            .await
            .map_err(AdminError::Read)?;
        Ok((*user).clone())
    }

    async fn require_user(&self) -> Result<User, AdminError> {
        match self.current_user().await? {
            Some(user) => Ok(user),
            None => {
                warn!("event=admin_guard module=service status=denied reason=no_session");
                Err(AdminError::Unauthenticated)
            }
        }
    }

    async fn read<T, Fut>(&self, read: Fut) -> Result<Arc<T>, AdminError>
    where
        Fut: Future<Output = Result<Arc<T>, FetchError>>,
    {
        self.require_user().await?;
        read.await.map_err(AdminError::Read)
    }

    async fn write<T, Fut>(&self, kind: MutationKind, write: Fut) -> Result<T, AdminError>
    where
        Fut: Future<Output = RepoResult<T>>,
    {
        self.require_user().await?;
        Ok(self.mutations.run(kind, write).await?)
    }

    // Singletons

    pub async fn profile(&self) -> Result<Arc<Option<Profile>>, AdminError> {
        self.read(self.reads.profile()).await
    }

    /// Updates the profile, or creates it when none exists yet.
    pub async fn upsert_profile(&self, patch: &ProfilePatch) -> Result<Profile, AdminError> {
        let repo = &self.reads.repos().profile;
        self.write(kind(Table::Profile, MutationOp::Upsert), repo.upsert(patch))
            .await
    }

    pub async fn about(&self) -> Result<Arc<Option<About>>, AdminError> {
        self.read(self.reads.about()).await
    }

    pub async fn upsert_about(&self, patch: &AboutPatch) -> Result<About, AdminError> {
        let repo = &self.reads.repos().about;
        self.write(kind(Table::About, MutationOp::Upsert), repo.upsert(patch))
            .await
    }

    // Contact entries

    pub async fn contact_info(&self) -> Result<Arc<Vec<ContactInfo>>, AdminError> {
        self.read(self.reads.contact_info()).await
    }

    pub async fn create_contact_info(
        &self,
        fields: &ContactInfoFields,
    ) -> Result<ContactInfo, AdminError> {
        let repo = &self.reads.repos().contact_info;
        self.write(kind(Table::ContactInfo, MutationOp::Create), repo.create(fields))
            .await
    }

    /// Creates an entry positioned after all existing ones.
    pub async fn append_contact_info(
        &self,
        mut fields: ContactInfoFields,
    ) -> Result<ContactInfo, AdminError> {
        fields.order_index = next_order_index(self.contact_info().await?.len());
        self.create_contact_info(&fields).await
    }

    pub async fn update_contact_info(
        &self,
        id: RowId,
        patch: &ContactInfoPatch,
    ) -> Result<ContactInfo, AdminError> {
        let repo = &self.reads.repos().contact_info;
        self.write(kind(Table::ContactInfo, MutationOp::Update), repo.update(id, patch))
            .await
    }

    pub async fn delete_contact_info(&self, id: RowId) -> Result<(), AdminError> {
        let repo = &self.reads.repos().contact_info;
        self.write(kind(Table::ContactInfo, MutationOp::Delete), repo.delete(id))
            .await
    }

    // Skills

    pub async fn skills(&self) -> Result<Arc<Vec<CategoryWithSkills>>, AdminError> {
        self.read(self.reads.skills_with_categories()).await
    }

    pub async fn create_category(
        &self,
        fields: &SkillCategoryFields,
    ) -> Result<SkillCategory, AdminError> {
        let repo = self.reads.repos().skills.categories();
        self.write(
            kind(Table::SkillCategories, MutationOp::Create),
            repo.create(fields),
        )
        .await
    }

    pub async fn append_category(
        &self,
        mut fields: SkillCategoryFields,
    ) -> Result<SkillCategory, AdminError> {
        fields.order_index = next_order_index(self.skills().await?.len());
        self.create_category(&fields).await
    }

    pub async fn update_category(
        &self,
        id: RowId,
        patch: &SkillCategoryPatch,
    ) -> Result<SkillCategory, AdminError> {
        let repo = self.reads.repos().skills.categories();
        self.write(
            kind(Table::SkillCategories, MutationOp::Update),
            repo.update(id, patch),
        )
        .await
    }

    /// Fails with store code `23503` while the category still has skills.
    pub async fn delete_category(&self, id: RowId) -> Result<(), AdminError> {
        let repo = self.reads.repos().skills.categories();
        self.write(
            kind(Table::SkillCategories, MutationOp::Delete),
            repo.delete(id),
        )
        .await
    }

    pub async fn create_skill(&self, fields: &SkillFields) -> Result<Skill, AdminError> {
        let repo = self.reads.repos().skills.skills();
        self.write(kind(Table::Skills, MutationOp::Create), repo.create(fields))
            .await
    }

    /// Creates a skill positioned after the other skills of its category.
    pub async fn append_skill(&self, mut fields: SkillFields) -> Result<Skill, AdminError> {
        let siblings = self
            .skills()
            .await?
            .iter()
            .find(|group| group.category.id == fields.category_id)
            .map_or(0, |group| group.skills.len());
        fields.order_index = next_order_index(siblings);
        self.create_skill(&fields).await
    }

    pub async fn update_skill(&self, id: RowId, patch: &SkillPatch) -> Result<Skill, AdminError> {
        let repo = self.reads.repos().skills.skills();
        self.write(kind(Table::Skills, MutationOp::Update), repo.update(id, patch))
            .await
    }

    pub async fn delete_skill(&self, id: RowId) -> Result<(), AdminError> {
        let repo = self.reads.repos().skills.skills();
        self.write(kind(Table::Skills, MutationOp::Delete), repo.delete(id))
            .await
    }

    // Projects

    pub async fn projects(&self) -> Result<Arc<Vec<Project>>, AdminError> {
        self.read(self.reads.projects()).await
    }

    pub async fn create_project(&self, fields: &ProjectFields) -> Result<Project, AdminError> {
        let repo = &self.reads.repos().projects;
        self.write(kind(Table::Projects, MutationOp::Create), repo.create(fields))
            .await
    }

    pub async fn append_project(&self, mut fields: ProjectFields) -> Result<Project, AdminError> {
        fields.order_index = next_order_index(self.projects().await?.len());
        self.create_project(&fields).await
    }

    pub async fn update_project(
        &self,
        id: RowId,
        patch: &ProjectPatch,
    ) -> Result<Project, AdminError> {
        let repo = &self.reads.repos().projects;
        self.write(kind(Table::Projects, MutationOp::Update), repo.update(id, patch))
            .await
    }

    pub async fn delete_project(&self, id: RowId) -> Result<(), AdminError> {
        let repo = &self.reads.repos().projects;
        self.write(kind(Table::Projects, MutationOp::Delete), repo.delete(id))
            .await
    }

    // Services

    pub async fn services(&self) -> Result<Arc<Vec<Service>>, AdminError> {
        self.read(self.reads.services()).await
    }

    pub async fn create_service(&self, fields: &ServiceFields) -> Result<Service, AdminError> {
        let repo = &self.reads.repos().services;
        self.write(kind(Table::Services, MutationOp::Create), repo.create(fields))
            .await
    }

    pub async fn append_service(&self, mut fields: ServiceFields) -> Result<Service, AdminError> {
        fields.order_index = next_order_index(self.services().await?.len());
        self.create_service(&fields).await
    }

    pub async fn update_service(
        &self,
        id: RowId,
        patch: &ServicePatch,
    ) -> Result<Service, AdminError> {
        let repo = &self.reads.repos().services;
        self.write(kind(Table::Services, MutationOp::Update), repo.update(id, patch))
            .await
    }

    pub async fn delete_service(&self, id: RowId) -> Result<(), AdminError> {
        let repo = &self.reads.repos().services;
        self.write(kind(Table::Services, MutationOp::Delete), repo.delete(id))
            .await
    }

    // Messages

    /// Inbox, newest first.
    pub async fn messages(&self) -> Result<Arc<Vec<Message>>, AdminError> {
        self.read(self.reads.messages()).await
    }

    pub async fn delete_message(&self, id: RowId) -> Result<(), AdminError> {
        let repo = &self.reads.repos().messages;
        self.write(kind(Table::Messages, MutationOp::Delete), repo.delete(id))
            .await
    }
}
