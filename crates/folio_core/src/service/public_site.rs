//! Read side of the public page plus the one public write.
//!
//! # Responsibility
//! - Load every page section through the query cache.
//! - Substitute [`DefaultContent`] when a section has no stored data.
//!
//! # Invariants
//! - A section falls back only when the store holds nothing for it, or when
//!   its read failed and no earlier value exists.
//! - Public reads never require a session.

use crate::cache::QueryKey;
use crate::model::contact::{split_by_kind, ContactInfoFields, Message, MessageFields};
use crate::model::defaults::DefaultContent;
use crate::model::profile::{AboutFields, ProfileFields};
use crate::model::project::ProjectFields;
use crate::model::service::ServiceFields;
use crate::model::skill::SkillGroup;
use crate::mutation::{MutationCoordinator, MutationKind, MutationOp};
use crate::repo::RepoResult;
use crate::service::reads::Reads;
use crate::store::Table;
use serde::Serialize;
use std::sync::Arc;

pub const SUBMIT_MESSAGE: MutationKind = MutationKind::table(Table::Messages, MutationOp::Submit);

/// Where a section's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSource {
    Stored,
    Fallback,
}

/// Content of one page section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section<T> {
    pub value: T,
    pub source: SectionSource,
}

impl<T> Section<T> {
    pub fn stored(value: T) -> Self {
        Self {
            value,
            source: SectionSource::Stored,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: SectionSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SectionSource::Fallback
    }
}

/// Contact section: direct channels and social links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactLists {
    pub contact: Vec<ContactInfoFields>,
    pub social: Vec<ContactInfoFields>,
}

/// Every section of the public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContent {
    pub profile: Section<ProfileFields>,
    pub about: Section<AboutFields>,
    pub services: Section<Vec<ServiceFields>>,
    pub skills: Section<Vec<SkillGroup>>,
    pub projects: Section<Vec<ProjectFields>>,
    pub contact: Section<ContactLists>,
}

/// Public, unauthenticated surface.
#[derive(Clone)]
pub struct PublicSite {
    reads: Reads,
    mutations: MutationCoordinator,
    defaults: Arc<DefaultContent>,
}

impl PublicSite {
    pub(crate) fn new(
        reads: Reads,
        mutations: MutationCoordinator,
        defaults: Arc<DefaultContent>,
    ) -> Self {
        Self {
            reads,
            mutations,
            defaults,
        }
    }

    pub fn defaults(&self) -> &DefaultContent {
        &self.defaults
    }

    pub(crate) fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    /// Loads all sections concurrently.
    pub async fn page(&self) -> PageContent {
        let (profile, about, services, skills, projects, contact) = futures::join!(
            self.profile(),
            self.about(),
            self.services(),
            self.skills(),
            self.projects(),
            self.contact()
        );
        PageContent {
            profile,
            about,
            services,
            skills,
            projects,
            contact,
        }
    }

    pub async fn profile(&self) -> Section<ProfileFields> {
        let stored = self
            .reads
            .or_last_good(QueryKey::Profile, self.reads.profile().await);
        match stored.as_deref() {
            Some(Some(profile)) => Section::stored(profile.fields.clone()),
            _ => Section::fallback(self.defaults.profile.clone()),
        }
    }

    pub async fn about(&self) -> Section<AboutFields> {
        let stored = self
            .reads
            .or_last_good(QueryKey::About, self.reads.about().await);
        match stored.as_deref() {
            Some(Some(about)) => Section::stored(about.fields.clone()),
            _ => Section::fallback(self.defaults.about.clone()),
        }
    }

    /// Services; the fallback is empty, which hides the section.
    pub async fn services(&self) -> Section<Vec<ServiceFields>> {
        let stored = self
            .reads
            .or_last_good(QueryKey::Services, self.reads.services().await);
        match stored.as_deref() {
            Some(services) if !services.is_empty() => Section::stored(
                services
                    .iter()
                    .map(|service| service.fields.clone())
                    .collect(),
            ),
            _ => Section::fallback(self.defaults.services.clone()),
        }
    }

    pub async fn skills(&self) -> Section<Vec<SkillGroup>> {
        let stored = self.reads.or_last_good(
            QueryKey::SkillsWithCategories,
            self.reads.skills_with_categories().await,
        );
        match stored.as_deref() {
            Some(groups) if !groups.is_empty() => {
                Section::stored(groups.iter().map(SkillGroup::from).collect())
            }
            _ => Section::fallback(self.defaults.skills.clone()),
        }
    }

    pub async fn projects(&self) -> Section<Vec<ProjectFields>> {
        let stored = self
            .reads
            .or_last_good(QueryKey::Projects, self.reads.projects().await);
        match stored.as_deref() {
            Some(projects) if !projects.is_empty() => Section::stored(
                projects
                    .iter()
                    .map(|project| project.fields.clone())
                    .collect(),
            ),
            _ => Section::fallback(self.defaults.projects.clone()),
        }
    }

    /// Contact entries split by kind. Falls back as a whole when no entry
    /// of either kind is stored.
    pub async fn contact(&self) -> Section<ContactLists> {
        let stored = self
            .reads
            .or_last_good(QueryKey::ContactInfo, self.reads.contact_info().await);
        let (entries, source) = match stored.as_deref() {
            Some(entries) if !entries.is_empty() => (
                entries
                    .iter()
                    .map(|entry| entry.fields.clone())
                    .collect::<Vec<_>>(),
                SectionSource::Stored,
            ),
            _ => (self.defaults.contact_info.clone(), SectionSource::Fallback),
        };
        let (contact, social) = split_by_kind(entries, |entry| entry.kind);
        Section {
            value: ContactLists { contact, social },
            source,
        }
    }

    /// Stores a contact form submission as an unread message.
    pub async fn submit_message(&self, fields: &MessageFields) -> RepoResult<Message> {
        let messages = &self.reads.repos().messages;
        self.mutations
            .run(SUBMIT_MESSAGE, messages.submit(fields))
            .await
    }
}
