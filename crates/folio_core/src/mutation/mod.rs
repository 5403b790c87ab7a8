//! Write coordination: status tracking and cache invalidation.
//!
//! # Responsibility
//! - Run each write exactly once and expose its `Idle/Pending/Success/Error`
//!   status per [`MutationKind`].
//! - Invalidate the dependent cache keys after a successful write.
//!
//! # Invariants
//! - A failed write leaves the cache untouched and is never retried here.
//! - Writes are neither queued nor coalesced; overlapping invocations of one
//!   kind both run, and only the most recent one writes the status.

use crate::cache::{QueryCache, QueryKey};
use crate::store::Table;
use log::{info, warn};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

/// What a write touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationTarget {
    Table(Table),
    /// The authentication session.
    Session,
}

impl MutationTarget {
    /// Cache keys whose data this target feeds.
    pub fn dependents(self) -> &'static [QueryKey] {
        match self {
            Self::Table(Table::Profile) => &[QueryKey::Profile],
            Self::Table(Table::About) => &[QueryKey::About],
            Self::Table(Table::ContactInfo) => &[QueryKey::ContactInfo],
            Self::Table(Table::Messages) => &[QueryKey::Messages],
            Self::Table(Table::SkillCategories | Table::Skills) => {
                &[QueryKey::SkillsWithCategories]
            }
            Self::Table(Table::Projects) => &[QueryKey::Projects],
            Self::Table(Table::Services) => &[QueryKey::Services],
            Self::Session => &[QueryKey::Auth],
        }
    }
}

impl Display for MutationTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table(table) => write!(f, "{table}"),
            Self::Session => f.write_str("session"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOp {
    Create,
    Update,
    Upsert,
    Delete,
    Submit,
    SignIn,
    SignOut,
}

impl MutationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::SignIn => "sign_in",
            Self::SignOut => "sign_out",
        }
    }
}

/// One kind of write, e.g. "create a project".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationKind {
    pub target: MutationTarget,
    pub op: MutationOp,
}

impl MutationKind {
    pub const fn table(table: Table, op: MutationOp) -> Self {
        Self {
            target: MutationTarget::Table(table),
            op,
        }
    }

    pub const fn session(op: MutationOp) -> Self {
        Self {
            target: MutationTarget::Session,
            op,
        }
    }
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.op.as_str(), self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    /// Carries the error message for display.
    Error(String),
}

struct Slot {
    tx: watch::Sender<MutationStatus>,
    latest: u64,
}

impl Slot {
    fn new() -> Self {
        let (tx, _) = watch::channel(MutationStatus::Idle);
        Self { tx, latest: 0 }
    }
}

struct Inner {
    cache: QueryCache,
    slots: Mutex<HashMap<MutationKind, Slot>>,
}

/// Shared handle running writes against one cache.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<Inner>,
}

impl MutationCoordinator {
    pub fn new(cache: QueryCache) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<MutationKind, Slot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `write` once, tracking status under `kind`.
    ///
    /// The error is handed back unchanged.
    pub async fn run<T, E, Fut>(&self, kind: MutationKind, write: Fut) -> Result<T, E>
    where
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let invocation = self.begin(kind);
        let started_at = Instant::now();
        info!("event=mutation module=mutation status=start kind={kind}");

        let result = write.await;
        match &result {
            Ok(_) => {
                self.finish(kind, invocation, MutationStatus::Success);
                for key in kind.target.dependents() {
                    self.inner.cache.invalidate(*key);
                }
                info!(
                    "event=mutation module=mutation status=ok kind={kind} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    "event=mutation module=mutation status=error kind={kind} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    message
                );
                self.finish(kind, invocation, MutationStatus::Error(message));
            }
        }
        result
    }

    pub fn status(&self, kind: MutationKind) -> MutationStatus {
        self.slots()
            .get(&kind)
            .map(|slot| slot.tx.borrow().clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self, kind: MutationKind) -> watch::Receiver<MutationStatus> {
        self.slots()
            .entry(kind)
            .or_insert_with(Slot::new)
            .tx
            .subscribe()
    }

    /// Returns `kind` to `Idle`, e.g. after its notification was dismissed.
    pub fn reset(&self, kind: MutationKind) {
        if let Some(slot) = self.slots().get(&kind) {
            slot.tx.send_replace(MutationStatus::Idle);
        }
    }

    fn begin(&self, kind: MutationKind) -> u64 {
        let mut slots = self.slots();
        let slot = slots.entry(kind).or_insert_with(Slot::new);
        slot.latest += 1;
        slot.tx.send_replace(MutationStatus::Pending);
        slot.latest
    }

    fn finish(&self, kind: MutationKind, invocation: u64, status: MutationStatus) {
        let slots = self.slots();
        if let Some(slot) = slots.get(&kind) {
            if slot.latest == invocation {
                slot.tx.send_replace(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationCoordinator, MutationKind, MutationOp, MutationStatus, MutationTarget};
    use crate::cache::{QueryCache, QueryKey};
    use crate::store::Table;

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
    async fn status_follows_the_write() {
        let coordinator = MutationCoordinator::new(QueryCache::default());
        let kind = MutationKind::table(Table::Projects, MutationOp::Create);
        assert_eq!(coordinator.status(kind), MutationStatus::Idle);

        let value = coordinator
            .run(kind, async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(coordinator.status(kind), MutationStatus::Success);

        let err = coordinator
            .run(kind, async { Err::<u32, _>("boom".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(
            coordinator.status(kind),
            MutationStatus::Error("boom".to_string())
        );

        coordinator.reset(kind);
        assert_eq!(coordinator.status(kind), MutationStatus::Idle);
    }

    #[test]
    fn kind_display_names_op_and_target() {
        let kind = MutationKind::session(MutationOp::SignIn);
        assert_eq!(kind.to_string(), "sign_in:session");
    }
}
