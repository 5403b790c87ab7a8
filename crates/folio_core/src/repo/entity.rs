//! Binding between typed records and store tables.
//!
//! # Invariants
//! - List order always ends with `id` so `order_index` ties resolve by
//!   insertion order.

use crate::model::contact::{ContactInfo, ContactInfoFields, ContactInfoPatch, Message, MessageFields};
use crate::model::profile::{About, AboutFields, AboutPatch, Profile, ProfileFields, ProfilePatch};
use crate::model::project::{Project, ProjectFields, ProjectPatch};
use crate::model::service::{Service, ServiceFields, ServicePatch};
use crate::model::skill::{
    Skill, SkillCategory, SkillCategoryFields, SkillCategoryPatch, SkillFields, SkillPatch,
};
use crate::model::validate::Validate;
use crate::store::{OrderTerm, RowId, Table};
use serde::de::DeserializeOwned;
use serde::Serialize;

const BY_ORDER_INDEX: &[OrderTerm] = &[OrderTerm::asc("order_index"), OrderTerm::asc("id")];
const BY_ID: &[OrderTerm] = &[OrderTerm::asc("id")];
const NEWEST_FIRST: &[OrderTerm] = &[OrderTerm::desc("created_at"), OrderTerm::desc("id")];

/// A persisted record type stored in one table.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// Default list order.
    const ORDER: &'static [OrderTerm];
    /// Whether updates stamp `updated_at`.
    const TRACKS_UPDATED_AT: bool = false;

    /// Insert payload.
    type Fields: Serialize + Validate + Send + Sync;

    fn id(&self) -> RowId;
}

/// Entity that accepts partial updates.
pub trait Editable: Entity {
    type Patch: Serialize + Validate + Send + Sync;
}

macro_rules! entity {
    ($record:ty, $table:expr, $order:expr, $tracks:expr, $fields:ty) => {
        impl Entity for $record {
            const TABLE: Table = $table;
            const ORDER: &'static [OrderTerm] = $order;
            const TRACKS_UPDATED_AT: bool = $tracks;
            type Fields = $fields;

            fn id(&self) -> RowId {
                self.id
            }
        }
    };
    ($record:ty, $table:expr, $order:expr, $tracks:expr, $fields:ty, $patch:ty) => {
        entity!($record, $table, $order, $tracks, $fields);

        impl Editable for $record {
            type Patch = $patch;
        }
    };
}

entity!(Profile, Table::Profile, BY_ID, true, ProfileFields, ProfilePatch);
entity!(About, Table::About, BY_ID, true, AboutFields, AboutPatch);
entity!(
    ContactInfo,
    Table::ContactInfo,
    BY_ORDER_INDEX,
    false,
    ContactInfoFields,
    ContactInfoPatch
);
entity!(Message, Table::Messages, NEWEST_FIRST, false, MessageFields);
entity!(
    SkillCategory,
    Table::SkillCategories,
    BY_ORDER_INDEX,
    false,
    SkillCategoryFields,
    SkillCategoryPatch
);
entity!(Skill, Table::Skills, BY_ORDER_INDEX, false, SkillFields, SkillPatch);
entity!(Project, Table::Projects, BY_ORDER_INDEX, false, ProjectFields, ProjectPatch);
entity!(Service, Table::Services, BY_ORDER_INDEX, true, ServiceFields, ServicePatch);
