use async_trait::async_trait;

use super::in_memory_database::InMemoryDatabase;
use super::in_memory_eval::{age_stats, average_age_by_team, sort_rows, window, Evaluator};
use crate::domain::member::MemberId;
use crate::errors::{QueryError, QueryResult};
use crate::query::composer::MemberQuery;
use crate::query::engine::{
    require_join, AgeStats, Assignment, MemberTeamRow, PagedRows, QueryEngine, TeamAgeAverage,
};
use crate::query::projection::{column_types, Cell, Expr};

/// QueryEngine evaluated directly over the in-memory roster
#[derive(Debug, Clone)]
pub struct InMemoryQueryEngine {
    db: InMemoryDatabase,
}

impl InMemoryQueryEngine {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &InMemoryDatabase {
        &self.db
    }
}

#[async_trait]
impl QueryEngine for InMemoryQueryEngine {
    async fn fetch(&self, query: &MemberQuery) -> QueryResult<Vec<MemberTeamRow>> {
        query.validate()?;
        self.db.record_select(query);

        let roster = self.db.read().await;
        let mut rows = Evaluator::new(&roster).matching_rows(query);
        sort_rows(&mut rows, query.orders());
        Ok(window(rows, query.row_offset(), query.row_limit()))
    }

    async fn count(&self, query: &MemberQuery) -> QueryResult<u64> {
        query.validate()?;
        self.db.record_count(query);

        let roster = self.db.read().await;
        Ok(Evaluator::new(&roster).matching_rows(query).len() as u64)
    }

    /// One statement, one read lock: content and total see the same roster
    async fn fetch_with_total(&self, query: &MemberQuery) -> QueryResult<PagedRows> {
        query.validate()?;
        self.db.record_select(query);

        let roster = self.db.read().await;
        let mut rows = Evaluator::new(&roster).matching_rows(query);
        let total = rows.len() as u64;
        sort_rows(&mut rows, query.orders());

        Ok(PagedRows {
            rows: window(rows, query.row_offset(), query.row_limit()),
            total,
        })
    }

    async fn age_stats(&self, query: &MemberQuery) -> QueryResult<AgeStats> {
        query.validate()?;
        self.db.record_select(query);

        let roster = self.db.read().await;
        Ok(age_stats(&Evaluator::new(&roster).matching_rows(query)))
    }

    async fn average_age_by_team(&self, query: &MemberQuery) -> QueryResult<Vec<TeamAgeAverage>> {
        query.validate()?;
        require_join(query)?;
        self.db.record_select(query);

        let roster = self.db.read().await;
        Ok(average_age_by_team(&Evaluator::new(&roster).matching_rows(query)))
    }

    async fn project(&self, query: &MemberQuery, columns: &[Expr]) -> QueryResult<Vec<Vec<Cell>>> {
        column_types(query, columns)?;
        self.db.record_select(query);

        let roster = self.db.read().await;
        let eval = Evaluator::new(&roster);
        let mut rows = eval.matching_rows(query);
        sort_rows(&mut rows, query.orders());

        Ok(window(rows, query.row_offset(), query.row_limit())
            .iter()
            .map(|row| columns.iter().map(|column| eval.project(column, row)).collect())
            .collect())
    }

    /// Matching and writing happen under one write lock
    ///
    /// New values are computed for every matching member before any is
    /// written, so a failing assignment leaves the roster untouched.
    async fn bulk_update(&self, query: &MemberQuery, assignment: Assignment) -> QueryResult<u64> {
        query.validate_bulk()?;
        let mut roster = self.db.write().await;

        let rows = Evaluator::new(&roster).matching_rows(query);
        let mut updates = Vec::with_capacity(rows.len());
        for row in rows {
            let age = match &assignment {
                Assignment::SetUsername(_) => row.age,
                Assignment::SetAge(age) => *age,
                Assignment::AddAge(delta) => row.age.checked_add(*delta).ok_or_else(|| {
                    QueryError::OutOfRange(format!(
                        "age {} + {} overflows for member {}",
                        row.age, delta, row.member_id
                    ))
                })?,
            };
            updates.push((row.member_id, age));
        }

        let mut affected = 0;
        for (id, age) in updates {
            let Some(member) = roster.member_mut(id) else {
                continue;
            };
            match &assignment {
                Assignment::SetUsername(username) => member.set_username(username.clone()),
                Assignment::SetAge(_) | Assignment::AddAge(_) => member.set_age(age),
            }
            affected += 1;
        }

        tracing::debug!(?assignment, affected, "bulk update");
        Ok(affected)
    }

    async fn bulk_delete(&self, query: &MemberQuery) -> QueryResult<u64> {
        query.validate_bulk()?;
        let mut roster = self.db.write().await;

        let ids: Vec<MemberId> = Evaluator::new(&roster)
            .matching_rows(query)
            .into_iter()
            .map(|row| row.member_id)
            .collect();

        let mut affected = 0;
        for id in ids {
            if roster.remove_member(id).is_ok() {
                affected += 1;
            }
        }

        tracing::debug!(affected, "bulk delete");
        Ok(affected)
    }
}
