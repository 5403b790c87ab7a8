//! Portfolio domain model.
//!
//! # Responsibility
//! - Define the typed records of the eight persisted entities.
//! - Split each entity into writable fields, persisted record and patch.
//! - Validate write payloads before they reach any store.
//!
//! # Invariants
//! - Records carry the server-assigned `id` and timestamps; fields never do.
//! - `order_index` defines presentation order inside each collection.

pub mod contact;
pub mod defaults;
pub mod icon;
pub mod profile;
pub mod project;
pub mod service;
pub mod skill;
pub mod validate;
