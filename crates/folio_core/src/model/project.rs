//! Portfolio projects.

use crate::model::validate::{require_opt_text, require_text, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PROJECT: &str = "project";

/// Writable project columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order_index: i32,
}

/// Persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub created_at: DateTime<Utc>,
}

/// Partial project update. `technologies` replaces the whole list when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl Validate for ProjectFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(PROJECT, "title", &self.title)?;
        require_text(PROJECT, "description", &self.description)
    }
}

impl Validate for ProjectPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::EmptyPatch { entity: PROJECT });
        }
        require_opt_text(PROJECT, "title", self.title.as_ref())?;
        require_opt_text(PROJECT, "description", self.description.as_ref())
    }
}

impl From<ProjectFields> for ProjectPatch {
    fn from(value: ProjectFields) -> Self {
        Self {
            title: Some(value.title),
            description: Some(value.description),
            technologies: Some(value.technologies),
            image_url: value.image_url,
            github_url: value.github_url,
            live_url: value.live_url,
            featured: Some(value.featured),
            order_index: Some(value.order_index),
        }
    }
}
