//! Use-case services consumed by the page and admin front ends.
//!
//! # Responsibility
//! - Compose repositories, cache and mutation coordinator into the public
//!   and admin surfaces.
//! - Keep presentation code unaware of stores and cache keys.

pub mod admin_console;
pub mod contact_form;
pub mod portfolio;
pub mod public_site;
mod reads;

pub use admin_console::{AdminConsole, AdminError};
pub use contact_form::{ContactForm, Notice, NoticeKind};
pub use portfolio::Portfolio;
pub use public_site::{ContactLists, PageContent, PublicSite, Section, SectionSource};
