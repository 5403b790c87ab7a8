//! Contact entries and inbound messages.
//!
//! # Invariants
//! - `ContactInfo` rows are split into contact and social lists by `kind`.
//! - `Message.read` starts `false` and no operation in this crate changes it.

use crate::model::icon::Icon;
use crate::model::validate::{
    require_email, require_opt_text, require_text, Validate, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const CONTACT_INFO: &str = "contact_info";
const MESSAGE: &str = "message";

/// Subtype of a contact entry, stored in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    /// Direct channel (email, phone, location).
    Contact,
    /// Social profile link.
    Social,
}

/// Writable contact entry columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfoFields {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub label: String,
    pub value: String,
    pub href: String,
    pub icon: Icon,
    #[serde(default)]
    pub order_index: i32,
}

/// Persisted contact entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ContactInfoFields,
    pub created_at: DateTime<Utc>,
}

/// Partial contact entry update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfoPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl Validate for ContactInfoFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(CONTACT_INFO, "label", &self.label)?;
        require_text(CONTACT_INFO, "value", &self.value)?;
        require_text(CONTACT_INFO, "href", &self.href)
    }
}

impl Validate for ContactInfoPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.is_none()
            && self.label.is_none()
            && self.value.is_none()
            && self.href.is_none()
            && self.icon.is_none()
            && self.order_index.is_none()
        {
            return Err(ValidationError::EmptyPatch {
                entity: CONTACT_INFO,
            });
        }
        require_opt_text(CONTACT_INFO, "label", self.label.as_ref())?;
        require_opt_text(CONTACT_INFO, "value", self.value.as_ref())?;
        require_opt_text(CONTACT_INFO, "href", self.href.as_ref())
    }
}

/// Public contact form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Persisted inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(flatten)]
    pub fields: MessageFields,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Validate for MessageFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(MESSAGE, "name", &self.name)?;
        require_text(MESSAGE, "email", &self.email)?;
        require_email(&self.email)?;
        require_text(MESSAGE, "subject", &self.subject)?;
        require_text(MESSAGE, "message", &self.message)
    }
}

/// Splits contact entries into `(contact, social)` lists, keeping order.
pub fn split_by_kind<T, F>(items: Vec<T>, kind_of: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> ContactKind,
{
    items
        .into_iter()
        .partition(|item| kind_of(item) == ContactKind::Contact)
}
