use async_trait::async_trait;
use serde::Serialize;

use super::composer::MemberQuery;
use super::projection::{Cell, Expr};
use crate::domain::member::MemberId;
use crate::domain::team::TeamId;
use crate::errors::{QueryError, QueryResult};

/// Team columns produced by the join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedTeam {
    pub id: TeamId,
    pub name: String,
}

/// One result row: a member plus whatever the join produced
///
/// `member_team_id` is the member's own foreign key and is always known;
/// `team` is only set when the query joined a team for this row. Unrelated
/// and cross joins may produce several rows per member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTeamRow {
    pub member_id: MemberId,
    pub username: Option<String>,
    pub age: i32,
    pub member_team_id: Option<TeamId>,
    pub team: Option<JoinedTeam>,
}

/// Content and total computed from one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedRows {
    pub rows: Vec<MemberTeamRow>,
    pub total: u64,
}

/// Aggregates over the ages of matching members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeStats {
    pub count: u64,
    pub sum: Option<i64>,
    pub avg: Option<f64>,
    pub max: Option<i32>,
    pub min: Option<i32>,
}

/// Average member age for one team name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAgeAverage {
    pub team_name: Option<String>,
    pub average_age: f64,
}

/// Column update applied by [`QueryEngine::bulk_update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    SetUsername(Option<String>),
    SetAge(i32),
    AddAge(i32),
}

/// Executes composed member queries
///
/// Every method validates the query first and fails fast with
/// [`QueryError::InvalidComposition`]; storage failures are returned
/// unchanged.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Matching rows, ordered and windowed by the query
    async fn fetch(&self, query: &MemberQuery) -> QueryResult<Vec<MemberTeamRow>>;

    /// Number of matching rows, ignoring ordering and paging
    async fn count(&self, query: &MemberQuery) -> QueryResult<u64>;

    /// Content plus total in one call
    ///
    /// The default issues two statements; engines that can read both from one
    /// snapshot override it.
    async fn fetch_with_total(&self, query: &MemberQuery) -> QueryResult<PagedRows> {
        let rows = self.fetch(query).await?;
        let total = self.count(&query.for_count()).await?;
        Ok(PagedRows { rows, total })
    }

    /// Exactly one row or none; more than one is an error
    async fn fetch_one(&self, query: &MemberQuery) -> QueryResult<Option<MemberTeamRow>> {
        let mut rows = self.fetch(query).await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            n => Err(QueryError::NonUniqueResult(n)),
        }
    }

    /// First row, if any
    async fn fetch_first(&self, query: &MemberQuery) -> QueryResult<Option<MemberTeamRow>> {
        let rows = self.fetch(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn age_stats(&self, query: &MemberQuery) -> QueryResult<AgeStats>;

    /// Average age grouped by joined team name, ordered by name
    ///
    /// Requires a team join.
    async fn average_age_by_team(&self, query: &MemberQuery) -> QueryResult<Vec<TeamAgeAverage>>;

    /// Evaluates `columns` for every matching row, ordered and windowed by the query
    async fn project(&self, query: &MemberQuery, columns: &[Expr]) -> QueryResult<Vec<Vec<Cell>>>;

    /// Applies `assignment` to every matching member; returns rows affected
    async fn bulk_update(&self, query: &MemberQuery, assignment: Assignment) -> QueryResult<u64>;

    /// Deletes every matching member; returns rows affected
    async fn bulk_delete(&self, query: &MemberQuery) -> QueryResult<u64>;
}

pub(crate) fn require_join(query: &MemberQuery) -> QueryResult<()> {
    if query.join_kind().is_none() {
        return Err(QueryError::InvalidComposition(
            "grouping by team requires a team join".to_string(),
        ));
    }
    Ok(())
}
