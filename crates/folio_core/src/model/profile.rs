//! Singleton content: hero profile and about section.
//!
//! # Invariants
//! - At most one row of each is expected; uniqueness is enforced by the
//!   probe-then-branch upsert in the repository layer, not by the store.
//! - Patches convert into full fields only when every required column is set.

use crate::model::validate::{
    require_opt_text, require_text, take_required, Validate, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PROFILE: &str = "profile";
const ABOUT: &str = "about";

/// Writable profile columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub hero_image_url: Option<String>,
}

/// Persisted profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
}

impl Validate for ProfileFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(PROFILE, "name", &self.name)?;
        require_text(PROFILE, "title", &self.title)?;
        require_text(PROFILE, "description", &self.description)
    }
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.hero_image_url.is_none()
        {
            return Err(ValidationError::EmptyPatch { entity: PROFILE });
        }
        require_opt_text(PROFILE, "name", self.name.as_ref())?;
        require_opt_text(PROFILE, "title", self.title.as_ref())?;
        require_opt_text(PROFILE, "description", self.description.as_ref())
    }
}

impl From<ProfileFields> for ProfilePatch {
    fn from(value: ProfileFields) -> Self {
        Self {
            name: Some(value.name),
            title: Some(value.title),
            description: Some(value.description),
            hero_image_url: value.hero_image_url,
        }
    }
}

impl TryFrom<ProfilePatch> for ProfileFields {
    type Error = ValidationError;

    fn try_from(value: ProfilePatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: take_required(PROFILE, "name", value.name)?,
            title: take_required(PROFILE, "title", value.title)?,
            description: take_required(PROFILE, "description", value.description)?,
            hero_image_url: value.hero_image_url,
        })
    }
}

/// Writable about columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutFields {
    pub content: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Persisted about row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub id: i64,
    #[serde(flatten)]
    pub fields: AboutFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial about update. `traits` replaces the whole list when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
}

impl Validate for AboutFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(ABOUT, "content", &self.content)
    }
}

impl Validate for AboutPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.content.is_none() && self.traits.is_none() {
            return Err(ValidationError::EmptyPatch { entity: ABOUT });
        }
        require_opt_text(ABOUT, "content", self.content.as_ref())
    }
}

impl From<AboutFields> for AboutPatch {
    fn from(value: AboutFields) -> Self {
        Self {
            content: Some(value.content),
            traits: Some(value.traits),
        }
    }
}

impl TryFrom<AboutPatch> for AboutFields {
    type Error = ValidationError;

    fn try_from(value: AboutPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            content: take_required(ABOUT, "content", value.content)?,
            traits: value.traits.unwrap_or_default(),
        })
    }
}
