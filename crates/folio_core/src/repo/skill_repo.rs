//! Skill categories, skills, and the joined category-with-skills read.

use crate::model::skill::{CategoryWithSkills, Skill, SkillCategory};
use crate::repo::entity::Entity;
use crate::repo::error::RepoResult;
use crate::repo::table_repo::{decode, TableRepository};
use crate::store::{DataStore, Embed, SelectQuery, Table};
use std::sync::Arc;

const SKILLS_BY_CATEGORY: Embed = Embed {
    table: Table::Skills,
    foreign_key: "category_id",
};

/// Access to both skill tables.
#[derive(Clone)]
pub struct SkillRepository {
    categories: TableRepository<SkillCategory>,
    skills: TableRepository<Skill>,
}

impl SkillRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            categories: TableRepository::new(Arc::clone(&store)),
            skills: TableRepository::new(store),
        }
    }

    pub fn categories(&self) -> &TableRepository<SkillCategory> {
        &self.categories
    }

    pub fn skills(&self) -> &TableRepository<Skill> {
        &self.skills
    }

    /// Lists categories in order, each with its skills embedded and ordered.
    ///
    /// Issues a single request.
    pub async fn list_with_categories(&self) -> RepoResult<Vec<CategoryWithSkills>> {
        let query = SelectQuery::new(SkillCategory::TABLE)
            .order_by(SkillCategory::ORDER)
            .embed(SKILLS_BY_CATEGORY);
        let rows = self.categories.store().select(&query).await?;
        let mut groups = rows
            .into_iter()
            .map(|row| decode::<CategoryWithSkills>(Table::SkillCategories, row))
            .collect::<RepoResult<Vec<_>>>()?;
        for group in &mut groups {
            group
                .skills
                .sort_by_key(|skill| (skill.fields.order_index, skill.id));
        }
        Ok(groups)
    }
}
