//! Skill categories and skills.
//!
//! # Invariants
//! - `Skill.category_id` references an existing `SkillCategory`.
//! - `Skill.proficiency` is within `1..=5`.

use crate::model::validate::{
    require_opt_text, require_range, require_text, Validate, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SKILL_CATEGORY: &str = "skill_category";
const SKILL: &str = "skill";

pub const MIN_PROFICIENCY: i32 = 1;
pub const MAX_PROFICIENCY: i32 = 5;

/// Writable skill category columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategoryFields {
    pub title: String,
    #[serde(default)]
    pub order_index: i32,
}

/// Persisted skill category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: i64,
    #[serde(flatten)]
    pub fields: SkillCategoryFields,
    pub created_at: DateTime<Utc>,
}

/// Partial skill category update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl Validate for SkillCategoryFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(SKILL_CATEGORY, "title", &self.title)
    }
}

impl Validate for SkillCategoryPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_none() && self.order_index.is_none() {
            return Err(ValidationError::EmptyPatch {
                entity: SKILL_CATEGORY,
            });
        }
        require_opt_text(SKILL_CATEGORY, "title", self.title.as_ref())
    }
}

/// Writable skill columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFields {
    pub category_id: i64,
    pub name: String,
    pub proficiency: i32,
    #[serde(default)]
    pub order_index: i32,
}

/// Persisted skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    #[serde(flatten)]
    pub fields: SkillFields,
    pub created_at: DateTime<Utc>,
}

/// Partial skill update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl Validate for SkillFields {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range(SKILL, "category_id", self.category_id, 1, i64::MAX)?;
        require_text(SKILL, "name", &self.name)?;
        require_range(
            SKILL,
            "proficiency",
            i64::from(self.proficiency),
            i64::from(MIN_PROFICIENCY),
            i64::from(MAX_PROFICIENCY),
        )
    }
}

impl Validate for SkillPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.category_id.is_none()
            && self.name.is_none()
            && self.proficiency.is_none()
            && self.order_index.is_none()
        {
            return Err(ValidationError::EmptyPatch { entity: SKILL });
        }
        if let Some(category_id) = self.category_id {
            require_range(SKILL, "category_id", category_id, 1, i64::MAX)?;
        }
        require_opt_text(SKILL, "name", self.name.as_ref())?;
        if let Some(proficiency) = self.proficiency {
            require_range(
                SKILL,
                "proficiency",
                i64::from(proficiency),
                i64::from(MIN_PROFICIENCY),
                i64::from(MAX_PROFICIENCY),
            )?;
        }
        Ok(())
    }
}

/// Category row with its embedded skills, as returned by the joined read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithSkills {
    #[serde(flatten)]
    pub category: SkillCategory,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Display projection of one category, shared by stored and fallback content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<SkillLevel>,
}

/// Skill name with its proficiency dots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillLevel {
    pub name: String,
    pub proficiency: i32,
}

impl From<&CategoryWithSkills> for SkillGroup {
    fn from(value: &CategoryWithSkills) -> Self {
        Self {
            title: value.category.fields.title.clone(),
            skills: value
                .skills
                .iter()
                .map(|skill| SkillLevel {
                    name: skill.fields.name.clone(),
                    proficiency: skill.fields.proficiency,
                })
                .collect(),
        }
    }
}
