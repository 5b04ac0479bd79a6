use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::roster::Roster;
use crate::query::composer::MemberQuery;

#[derive(Debug, Default)]
struct Inner {
    roster: RwLock<Roster>,
    select_statements: AtomicU64,
    count_statements: AtomicU64,
}

/// Shared in-memory storage, the counterpart of a connection pool
///
/// Cloning is cheap and every clone sees the same [`Roster`]. Writers take the
/// lock exclusively, so a team change updates both sides of the relation
/// before any reader can look. Executed select and count statements are
/// tallied so callers can see which statements a pagination strategy issued.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    inner: Arc<Inner>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Roster> {
        self.inner.roster.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Roster> {
        self.inner.roster.write().await
    }

    /// Copy of the current arena
    pub async fn snapshot(&self) -> Roster {
        self.read().await.clone()
    }

    /// Number of row-returning statements executed so far
    pub fn select_statements(&self) -> u64 {
        self.inner.select_statements.load(Ordering::SeqCst)
    }

    /// Number of count statements executed so far
    pub fn count_statements(&self) -> u64 {
        self.inner.count_statements.load(Ordering::SeqCst)
    }

    pub fn reset_statement_counters(&self) {
        self.inner.select_statements.store(0, Ordering::SeqCst);
        self.inner.count_statements.store(0, Ordering::SeqCst);
    }

    pub(crate) fn record_select(&self, query: &MemberQuery) {
        self.inner.select_statements.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            join = ?query.join_kind(),
            filters = query.filters().len(),
            offset = ?query.row_offset(),
            limit = ?query.row_limit(),
            "select members"
        );
    }

    pub(crate) fn record_count(&self, query: &MemberQuery) {
        self.inner.count_statements.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            join = ?query.join_kind(),
            filters = query.filters().len(),
            "count members"
        );
    }
}
