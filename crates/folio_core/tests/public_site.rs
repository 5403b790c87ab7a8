mod common;

use common::{contact, portfolio, project, CountingStore, ADMIN_EMAIL, ADMIN_PASSWORD};
use folio_core::model::contact::ContactKind;
use folio_core::model::profile::ProfilePatch;
use folio_core::model::skill::{SkillCategoryFields, SkillFields};
use folio_core::{DefaultContent, Icon, SectionSource};

#[tokio::test]
async fn empty_store_renders_every_fallback() {
    let store = CountingStore::new();
    let site = portfolio(&store).public_site();
    let defaults = DefaultContent::default();

    let page = site.page().await;
    assert!(page.profile.is_fallback());
    assert_eq!(page.profile.value, defaults.profile);
    assert!(page.about.is_fallback());
    assert_eq!(page.about.value, defaults.about);
    assert!(page.skills.is_fallback());
    assert_eq!(page.skills.value, defaults.skills);
    assert!(page.projects.is_fallback());
    assert_eq!(page.projects.value, defaults.projects);
    assert!(page.services.is_fallback());
    assert!(page.services.value.is_empty());

    assert!(page.contact.is_fallback());
    assert_eq!(page.contact.value.contact.len(), 3);
    assert_eq!(page.contact.value.social.len(), 3);
    assert!(page
        .contact
        .value
        .social
        .iter()
        .all(|entry| entry.kind == ContactKind::Social));
}

#[tokio::test]
async fn stored_sections_replace_fallbacks_independently() {
    let store = CountingStore::new();
    let portfolio = portfolio(&store);
    let admin = portfolio.admin();
    admin.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    admin
        .upsert_profile(&ProfilePatch {
            name: Some("Ana".to_string()),
            title: Some("Engineer".to_string()),
            description: Some("Writes Rust.".to_string()),
            hero_image_url: None,
        })
        .await
        .unwrap();
    let category = admin
        .append_category(SkillCategoryFields {
            title: "Backend".to_string(),
            order_index: 0,
        })
        .await
        .unwrap();
    admin
        .append_skill(SkillFields {
            category_id: category.id,
            name: "Rust".to_string(),
            proficiency: 5,
            order_index: 0,
        })
        .await
        .unwrap();
    admin.sign_out().await.unwrap();

    let page = portfolio.public_site().page().await;
    assert_eq!(page.profile.source, SectionSource::Stored);
    assert_eq!(page.profile.value.name, "Ana");
    assert_eq!(page.skills.source, SectionSource::Stored);
    assert_eq!(page.skills.value.len(), 1);
    assert_eq!(page.skills.value[0].skills[0].name, "Rust");
    assert_eq!(page.skills.value[0].skills[0].proficiency, 5);
    assert!(page.about.is_fallback());
    assert!(page.projects.is_fallback());
}

#[tokio::test]
async fn stored_contact_entries_split_by_kind_in_order() {
    let store = CountingStore::new();
    let portfolio = portfolio(&store);
    let admin = portfolio.admin();
    admin.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    for fields in [
        contact(ContactKind::Social, Icon::Linkedin, "LinkedIn", 2),
        contact(ContactKind::Contact, Icon::Mail, "Email", 0),
        contact(ContactKind::Social, Icon::Github, "GitHub", 1),
    ] {
        admin.create_contact_info(&fields).await.unwrap();
    }

    let section = portfolio.public_site().contact().await;
    assert_eq!(section.source, SectionSource::Stored);
    let contact_labels: Vec<&str> = section
        .value
        .contact
        .iter()
        .map(|entry| entry.label.as_str())
        .collect();
    let social_labels: Vec<&str> = section
        .value
        .social
        .iter()
        .map(|entry| entry.label.as_str())
        .collect();
    assert_eq!(contact_labels, ["Email"]);
    assert_eq!(social_labels, ["GitHub", "LinkedIn"]);
}

#[tokio::test]
async fn failed_refresh_keeps_last_stored_value() {
    let store = CountingStore::new();
    let portfolio = portfolio(&store);
    let admin = portfolio.admin();
    admin.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    admin.create_project(&project("folio", 0)).await.unwrap();

    let site = portfolio.public_site();
    assert_eq!(site.projects().await.value, vec![project("folio", 0)]);

    store.set_offline(true);
    let projects = site.projects().await;
    assert_eq!(projects.source, SectionSource::Stored);
    assert_eq!(projects.value, vec![project("folio", 0)]);
}

#[tokio::test]
async fn unreachable_store_without_history_falls_back() {
    let store = CountingStore::new();
    store.set_offline(true);
    let page = portfolio(&store).public_site().page().await;

    assert!(page.profile.is_fallback());
    assert!(page.projects.is_fallback());
    assert!(page.contact.is_fallback());
}

#[tokio::test]
async fn page_serializes_section_sources() {
    let store = CountingStore::new();
    let page = portfolio(&store).public_site().page().await;
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["profile"]["source"], "fallback");
    assert_eq!(json["profile"]["value"]["name"], "John Doe");
    assert_eq!(json["contact"]["value"]["contact"][0]["type"], "contact");
    assert_eq!(json["contact"]["value"]["contact"][0]["icon"], "Mail");
}
