use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::postgres_sql::{self, Sql, MEMBER_ALIAS};
use crate::domain::team::TeamId;
use crate::errors::QueryResult;
use crate::query::composer::MemberQuery;
use crate::query::engine::{
    require_join, AgeStats, Assignment, JoinedTeam, MemberTeamRow, PagedRows, QueryEngine,
    TeamAgeAverage,
};
use crate::query::projection::{column_types, Cell, CellType, Expr};

/// QueryEngine that renders composed queries to SQL and runs them on PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresQueryEngine {
    pool: PgPool,
}

impl PostgresQueryEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> QueryResult<MemberTeamRow> {
        let team_id: Option<TeamId> = row.try_get("team_id")?;
        let team_name: Option<String> = row.try_get("team_name")?;

        Ok(MemberTeamRow {
            member_id: row.try_get("member_id")?,
            username: row.try_get("username")?,
            age: row.try_get("age")?,
            member_team_id: row.try_get("member_team_id")?,
            team: team_id
                .zip(team_name)
                .map(|(id, name)| JoinedTeam { id, name }),
        })
    }

    fn read_cell(row: &PgRow, index: usize, cell_type: CellType) -> QueryResult<Cell> {
        let cell = match cell_type {
            CellType::Long => row
                .try_get::<Option<i64>, _>(index)?
                .map_or(Cell::Null, Cell::Long),
            CellType::Double => row
                .try_get::<Option<f64>, _>(index)?
                .map_or(Cell::Null, Cell::Double),
            CellType::Text => row
                .try_get::<Option<String>, _>(index)?
                .map_or(Cell::Null, Cell::Text),
        };
        Ok(cell)
    }
}

#[async_trait]
impl QueryEngine for PostgresQueryEngine {
    async fn fetch(&self, query: &MemberQuery) -> QueryResult<Vec<MemberTeamRow>> {
        query.validate()?;
        let mut sql = postgres_sql::select_rows(query, false);
        tracing::debug!(sql = sql.sql(), "select members");

        let rows = sql.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn count(&self, query: &MemberQuery) -> QueryResult<u64> {
        query.validate()?;
        let mut sql = postgres_sql::select_count(query);
        tracing::debug!(sql = sql.sql(), "count members");

        let count: i64 = sql.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    /// Rows carry `COUNT(*) OVER ()`, so content and total come from one statement
    ///
    /// A page past the end has no rows to carry the total; a count statement
    /// fills the gap.
    async fn fetch_with_total(&self, query: &MemberQuery) -> QueryResult<PagedRows> {
        query.validate()?;
        let mut sql = postgres_sql::select_rows(query, true);
        tracing::debug!(sql = sql.sql(), "select members with total");

        let raw = sql.build().fetch_all(&self.pool).await?;
        let total = match raw.first() {
            Some(first) => first.try_get::<i64, _>("total_count")?.max(0) as u64,
            None if query.row_offset().unwrap_or(0) > 0 => {
                tracing::warn!("page past the end; falling back to a count statement");
                self.count(&query.for_count()).await?
            }
            None => 0,
        };

        let rows = raw.iter().map(Self::map_row).collect::<QueryResult<Vec<_>>>()?;
        Ok(PagedRows { rows, total })
    }

    async fn age_stats(&self, query: &MemberQuery) -> QueryResult<AgeStats> {
        query.validate()?;
        let mut sql = postgres_sql::select_age_stats(query);
        tracing::debug!(sql = sql.sql(), "member age stats");

        let row = sql.build().fetch_one(&self.pool).await?;
        Ok(AgeStats {
            count: row.try_get::<i64, _>("count")?.max(0) as u64,
            sum: row.try_get("sum")?,
            avg: row.try_get("avg")?,
            max: row.try_get("max")?,
            min: row.try_get("min")?,
        })
    }

    async fn average_age_by_team(&self, query: &MemberQuery) -> QueryResult<Vec<TeamAgeAverage>> {
        query.validate()?;
        require_join(query)?;
        let mut sql = postgres_sql::select_average_age_by_team(query);
        tracing::debug!(sql = sql.sql(), "average age by team");

        let rows = sql.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> QueryResult<TeamAgeAverage> {
                Ok(TeamAgeAverage {
                    team_name: row.try_get("team_name")?,
                    average_age: row.try_get("average_age")?,
                })
            })
            .collect()
    }

    async fn project(&self, query: &MemberQuery, columns: &[Expr]) -> QueryResult<Vec<Vec<Cell>>> {
        let types = column_types(query, columns)?;
        let mut sql = postgres_sql::select_projection(query, columns, &types);
        tracing::debug!(sql = sql.sql(), "project members");

        let rows = sql.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> QueryResult<Vec<Cell>> {
                types
                    .iter()
                    .enumerate()
                    .map(|(index, cell_type)| Self::read_cell(row, index, *cell_type))
                    .collect()
            })
            .collect()
    }

    async fn bulk_update(&self, query: &MemberQuery, assignment: Assignment) -> QueryResult<u64> {
        query.validate_bulk()?;

        let mut sql = Sql::new("UPDATE members AS m SET ");
        match &assignment {
            Assignment::SetUsername(username) => {
                sql.push("username = ");
                sql.push_bind(username.clone());
            }
            Assignment::SetAge(age) => {
                sql.push("age = ");
                sql.push_bind(*age);
            }
            Assignment::AddAge(delta) => {
                sql.push("age = m.age + ");
                sql.push_bind(*delta);
            }
        }
        postgres_sql::push_where(&mut sql, query.filters(), MEMBER_ALIAS);
        tracing::debug!(sql = sql.sql(), "bulk update members");

        let result = sql.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn bulk_delete(&self, query: &MemberQuery) -> QueryResult<u64> {
        query.validate_bulk()?;
        let mut sql = postgres_sql::delete_members(query);
        tracing::debug!(sql = sql.sql(), "bulk delete members");

        let result = sql.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
