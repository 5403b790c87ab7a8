mod common;

use common::{project, CountingStore, ADMIN_EMAIL, ADMIN_PASSWORD};
use folio_core::cache::{QueryCache, QueryKey, QueryStatus};
use folio_core::model::project::{Project, ProjectPatch};
use folio_core::mutation::MutationTarget;
use folio_core::store::Table;
use folio_core::{
    CacheConfig, DefaultContent, MutationCoordinator, MutationKind, MutationOp, MutationStatus,
    Portfolio,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

fn long_lived_portfolio(store: &Arc<CountingStore>) -> Portfolio {
    Portfolio::with_backend(
        Arc::clone(store),
        CacheConfig {
            stale_time: Duration::from_secs(3600),
        },
        DefaultContent::default(),
    )
}

#[tokio::test]
async fn successful_create_refreshes_cached_list() {
    let store = CountingStore::new();
    let portfolio = long_lived_portfolio(&store);
    let site = portfolio.public_site();
    let admin = portfolio.admin();

    assert!(site.projects().await.is_fallback());
    admin.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    admin.create_project(&project("folio", 0)).await.unwrap();

    let projects = site.projects().await;
    assert!(!projects.is_fallback());
    assert_eq!(projects.value, vec![project("folio", 0)]);
    assert_eq!(
        admin
            .mutations()
            .status(MutationKind::table(Table::Projects, MutationOp::Create)),
        MutationStatus::Success
    );
}

#[tokio::test]
async fn failed_write_leaves_cache_untouched() {
    let store = CountingStore::new();
    let portfolio = long_lived_portfolio(&store);
    let site = portfolio.public_site();
    let admin = portfolio.admin();
    admin.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    admin.create_project(&project("folio", 0)).await.unwrap();
    site.projects().await;

    let selects_before = store.selects();
    let err = admin
        .update_project(
            999,
            &ProjectPatch {
                featured: Some(true),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("999"));

    let status = admin
        .mutations()
        .status(MutationKind::table(Table::Projects, MutationOp::Update));
    assert!(matches!(status, MutationStatus::Error(message) if message.contains("999")));

    let snapshot = portfolio.cache().peek::<Vec<Project>>(QueryKey::Projects).unwrap();
    assert_eq!(snapshot.status, QueryStatus::Resolved);
    site.projects().await;
    assert_eq!(store.selects(), selects_before);
}

#[test]
fn skill_writes_invalidate_the_joined_read() {
    assert_eq!(
        MutationTarget::Table(Table::Skills).dependents(),
        &[QueryKey::SkillsWithCategories]
    );
    assert_eq!(
        MutationTarget::Table(Table::SkillCategories).dependents(),
        &[QueryKey::SkillsWithCategories]
    );
    assert_eq!(MutationTarget::Session.dependents(), &[QueryKey::Auth]);
}

#[tokio::test]
async fn latest_invocation_owns_the_status() {
    let coordinator = MutationCoordinator::new(QueryCache::default());
    let kind = MutationKind::table(Table::Projects, MutationOp::Create);
    let gate = Arc::new(Semaphore::new(0));

    let slow = tokio::spawn({
        let coordinator = coordinator.clone();
        let gate = Arc::clone(&gate);
        async move {
            coordinator
                .run(kind, async move {
                    let _permit = gate.acquire().await.map_err(|err| err.to_string())?;
                    Err::<u32, String>("first write rejected".to_string())
                })
                .await
        }
    });
    tokio::task::yield_now().await;
    assert_eq!(coordinator.status(kind), MutationStatus::Pending);

    let fast = coordinator.run(kind, async { Ok::<u32, String>(2) }).await;
    assert_eq!(fast.unwrap(), 2);

    gate.add_permits(1);
    let slow = slow.await.unwrap();
    assert_eq!(slow.unwrap_err(), "first write rejected");
    assert_eq!(coordinator.status(kind), MutationStatus::Success);
}

#[tokio::test]
async fn status_moves_through_pending_and_resets_to_idle() {
    let coordinator = MutationCoordinator::new(QueryCache::default());
    let kind = MutationKind::session(MutationOp::SignOut);
    let mut rx = coordinator.subscribe(kind);
    assert_eq!(*rx.borrow(), MutationStatus::Idle);

    let gate = Arc::new(Semaphore::new(0));
    let run = {
        let gate = Arc::clone(&gate);
        coordinator.run(kind, async move {
            let _permit = gate.acquire().await.map_err(|err| err.to_string())?;
            Ok::<(), String>(())
        })
    };
    let observe = async {
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MutationStatus::Pending);
        gate.add_permits(1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MutationStatus::Success);
    };
    let (result, ()) = tokio::join!(run, observe);
    result.unwrap();

    coordinator.reset(kind);
    assert_eq!(coordinator.status(kind), MutationStatus::Idle);
}
