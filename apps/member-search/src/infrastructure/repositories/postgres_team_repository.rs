use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::member::MemberId;
use crate::domain::repositories::TeamRepository;
use crate::domain::team::{NewTeam, Team, TeamId};
use crate::errors::{QueryError, QueryResult};

/// PostgreSQL implementation of TeamRepository
///
/// The relation is stored once, as `members.team_id`; a team's member list is
/// read back from that column so both sides always agree.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn member_ids(&self, team_id: TeamId) -> QueryResult<Vec<MemberId>> {
        let ids = sqlx::query_scalar::<_, MemberId>(
            r#"
            SELECT id FROM members
            WHERE team_id = $1
            ORDER BY id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn hydrate(&self, rows: Vec<(TeamId, String)>) -> QueryResult<Vec<Team>> {
        let mut teams = Vec::with_capacity(rows.len());
        for (id, name) in rows {
            let member_ids = self.member_ids(id).await?;
            teams.push(Team::from_persistence(id, name, member_ids));
        }
        Ok(teams)
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn save(&self, team: NewTeam) -> QueryResult<Team> {
        let id = sqlx::query_scalar::<_, TeamId>(
            r#"
            INSERT INTO teams (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(&team.name)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(team_id = %id, "team saved");
        Ok(Team::from_persistence(id, team.name, Vec::new()))
    }

    async fn find_by_id(&self, id: TeamId) -> QueryResult<Option<Team>> {
        let row = sqlx::query_as::<_, (TeamId, String)>(
            r#"
            SELECT id, name
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_name(&self, name: &str) -> QueryResult<Option<Team>> {
        let rows = sqlx::query_as::<_, (TeamId, String)>(
            r#"
            SELECT id, name
            FROM teams
            WHERE name = $1
            ORDER BY id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > 1 {
            return Err(QueryError::NonUniqueResult(rows.len()));
        }
        Ok(self.hydrate(rows).await?.pop())
    }

    async fn find_all(&self) -> QueryResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, (TeamId, String)>(
            r#"
            SELECT id, name
            FROM teams
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let memberships = sqlx::query_as::<_, (MemberId, TeamId)>(
            r#"
            SELECT id, team_id
            FROM members
            WHERE team_id IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_team: HashMap<TeamId, Vec<MemberId>> = HashMap::new();
        for (member_id, team_id) in memberships {
            by_team.entry(team_id).or_default().push(member_id);
        }

        Ok(rows
            .into_iter()
            .map(|(id, name)| {
                let member_ids = by_team.remove(&id).unwrap_or_default();
                Team::from_persistence(id, name, member_ids)
            })
            .collect())
    }
}
