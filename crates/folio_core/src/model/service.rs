//! Offered services shown in the services section.

use crate::model::validate::{require_opt_text, require_text, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "service";

/// Writable service columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub title: String,
    pub description: String,
    /// Emoji rendered as-is.
    pub icon: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub order_index: i32,
}

/// Persisted service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ServiceFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial service update. `features` replaces the whole list when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl Validate for ServiceFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(SERVICE, "title", &self.title)?;
        require_text(SERVICE, "description", &self.description)?;
        require_text(SERVICE, "icon", &self.icon)
    }
}

impl Validate for ServicePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::EmptyPatch { entity: SERVICE });
        }
        require_opt_text(SERVICE, "title", self.title.as_ref())?;
        require_opt_text(SERVICE, "description", self.description.as_ref())?;
        require_opt_text(SERVICE, "icon", self.icon.as_ref())
    }
}
