mod common;

use common::{project, signed_in_store, CountingStore};
use folio_core::model::project::{Project, ProjectPatch};
use folio_core::model::service::{Service, ServiceFields, ServicePatch};
use folio_core::model::skill::{Skill, SkillCategoryFields, SkillFields};
use folio_core::model::validate::ValidationError;
use folio_core::repo::{MessageRepository, RepoError, SkillRepository, TableRepository};
use folio_core::store::Table;
use folio_core::DataStore;
use std::sync::Arc;

fn projects(store: &Arc<CountingStore>) -> TableRepository<Project> {
    TableRepository::new(Arc::clone(store) as Arc<dyn DataStore>)
}

fn skills(store: &Arc<CountingStore>) -> SkillRepository {
    SkillRepository::new(Arc::clone(store) as Arc<dyn DataStore>)
}

#[tokio::test]
async fn empty_tables_list_as_empty_vectors() {
    let store = signed_in_store().await;
    assert!(projects(&store).list().await.unwrap().is_empty());
    assert!(skills(&store).list_with_categories().await.unwrap().is_empty());
    let messages = MessageRepository::new(Arc::clone(&store) as Arc<dyn DataStore>);
    assert!(messages.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_assigns_id_and_created_at() {
    let store = signed_in_store().await;
    let repo = projects(&store);

    let created = repo.create(&project("folio", 0)).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.fields, project("folio", 0));

    let listed = repo.list().await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn invalid_payload_is_rejected_before_any_request() {
    let store = signed_in_store().await;
    let repo = projects(&store);

    let mut fields = project("folio", 0);
    fields.title = "   ".to_string();
    let err = repo.create(&fields).await.unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField {
            field: "title",
            ..
        })
    ));

    let err = repo.update(1, &ProjectPatch::default()).await.unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyPatch { .. })
    ));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn skills_list_in_order_index_order() {
    let store = signed_in_store().await;
    let repo = skills(&store);
    let category = repo
        .categories()
        .create(&SkillCategoryFields {
            title: "Backend".to_string(),
            order_index: 0,
        })
        .await
        .unwrap();

    for (name, order_index) in [("Go", 2), ("Rust", 0), ("SQL", 1)] {
        repo.skills()
            .create(&SkillFields {
                category_id: category.id,
                name: name.to_string(),
                proficiency: 4,
                order_index,
            })
            .await
            .unwrap();
    }

    let names: Vec<String> = repo
        .skills()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|skill: Skill| skill.fields.name)
        .collect();
    assert_eq!(names, ["Rust", "SQL", "Go"]);
}

#[tokio::test]
async fn order_index_ties_resolve_by_insertion_order() {
    let store = signed_in_store().await;
    let repo = projects(&store);
    for title in ["first", "second", "third"] {
        repo.create(&project(title, 1)).await.unwrap();
    }
    repo.create(&project("zeroth", 0)).await.unwrap();

    let titles: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|project| project.fields.title)
        .collect();
    assert_eq!(titles, ["zeroth", "first", "second", "third"]);
}

#[tokio::test]
async fn joined_read_embeds_ordered_skills_per_category() {
    let store = signed_in_store().await;
    let repo = skills(&store);
    let frontend = repo
        .categories()
        .create(&SkillCategoryFields {
            title: "Frontend".to_string(),
            order_index: 1,
        })
        .await
        .unwrap();
    let backend = repo
        .categories()
        .create(&SkillCategoryFields {
            title: "Backend".to_string(),
            order_index: 0,
        })
        .await
        .unwrap();
    for (category_id, name, order_index) in [
        (frontend.id, "CSS", 1),
        (frontend.id, "React", 0),
        (backend.id, "Rust", 0),
    ] {
        repo.skills()
            .create(&SkillFields {
                category_id,
                name: name.to_string(),
                proficiency: 5,
                order_index,
            })
            .await
            .unwrap();
    }

    let selects_before = store.selects();
    let groups = repo.list_with_categories().await.unwrap();
    assert_eq!(store.selects() - selects_before, 1);

    let shape: Vec<(String, Vec<String>)> = groups
        .iter()
        .map(|group| {
            (
                group.category.fields.title.clone(),
                group
                    .skills
                    .iter()
                    .map(|skill| skill.fields.name.clone())
                    .collect(),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            ("Backend".to_string(), vec!["Rust".to_string()]),
            (
                "Frontend".to_string(),
                vec!["React".to_string(), "CSS".to_string()]
            ),
        ]
    );
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let store = signed_in_store().await;
    let err = projects(&store)
        .update(
            404,
            &ProjectPatch {
                title: Some("ghost".to_string()),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            table: Table::Projects,
            id: 404
        }
    ));
}

#[tokio::test]
async fn second_delete_of_same_id_is_not_found() {
    let store = signed_in_store().await;
    let repo = projects(&store);
    let created = repo.create(&project("folio", 0)).await.unwrap();

    repo.delete(created.id).await.unwrap();
    let err = repo.delete(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn repeated_identical_update_is_idempotent() {
    let store = signed_in_store().await;
    let repo = projects(&store);
    let created = repo.create(&project("folio", 0)).await.unwrap();
    let patch = ProjectPatch {
        featured: Some(true),
        technologies: Some(vec!["Rust".to_string()]),
        ..ProjectPatch::default()
    };

    let once = repo.update(created.id, &patch).await.unwrap();
    let twice = repo.update(created.id, &patch).await.unwrap();
    assert_eq!(once, twice);
    assert_eq!(repo.list().await.unwrap(), vec![twice]);
}

#[tokio::test]
async fn service_updates_stamp_updated_at() {
    let store = signed_in_store().await;
    let repo: TableRepository<Service> =
        TableRepository::new(Arc::clone(&store) as Arc<dyn DataStore>);
    let created = repo
        .create(&ServiceFields {
            title: "Consulting".to_string(),
            description: "Architecture reviews".to_string(),
            icon: "🧭".to_string(),
            features: vec!["Audits".to_string()],
            order_index: 0,
        })
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = repo
        .update(
            created.id,
            &ServicePatch {
                features: Some(vec!["Audits".to_string(), "Mentoring".to_string()]),
                ..ServicePatch::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.fields.features.len(), 2);
}

#[tokio::test]
async fn deleting_category_with_skills_is_rejected() {
    let store = signed_in_store().await;
    let repo = skills(&store);
    let category = repo
        .categories()
        .create(&SkillCategoryFields {
            title: "Backend".to_string(),
            order_index: 0,
        })
        .await
        .unwrap();
    let skill = repo
        .skills()
        .create(&SkillFields {
            category_id: category.id,
            name: "Rust".to_string(),
            proficiency: 5,
            order_index: 0,
        })
        .await
        .unwrap();

    let err = repo.categories().delete(category.id).await.unwrap_err();
    assert_eq!(err.store_code(), Some("23503"));

    repo.skills().delete(skill.id).await.unwrap();
    repo.categories().delete(category.id).await.unwrap();
}

#[tokio::test]
async fn skill_with_unknown_category_keeps_store_code() {
    let store = signed_in_store().await;
    let err = skills(&store)
        .skills()
        .create(&SkillFields {
            category_id: 77,
            name: "Rust".to_string(),
            proficiency: 3,
            order_index: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.store_code(), Some("23503"));
}
