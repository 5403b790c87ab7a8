//! Public contact form state.
//!
//! # Invariants
//! - Fields are cleared only after a successful submission; on failure the
//!   visitor's input is kept for a retry.

use crate::model::contact::MessageFields;
use crate::mutation::MutationStatus;
use crate::service::public_site::{PublicSite, SUBMIT_MESSAGE};
use log::info;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Dismissible user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub struct ContactForm {
    site: PublicSite,
    fields: MessageFields,
}

impl ContactForm {
    pub fn new(site: PublicSite) -> Self {
        Self {
            site,
            fields: MessageFields::default(),
        }
    }

    pub fn fields(&self) -> &MessageFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }

    /// Status of the last submission.
    pub fn status(&self) -> MutationStatus {
        self.site.mutations().status(SUBMIT_MESSAGE)
    }

    /// Submits the current fields and reports the outcome as a notice.
    pub async fn submit(&mut self) -> Notice {
        match self.site.submit_message(&self.fields).await {
            Ok(message) => {
                info!(
                    "event=contact_submit module=service status=ok message_id={}",
                    message.id
                );
                self.fields = MessageFields::default();
                Notice::success(
                    "Message sent!",
                    "Thank you for reaching out. I'll get back to you soon.",
                )
            }
            Err(err) => Notice::error("Error", format!("Failed to send message: {err}")),
        }
    }
}
