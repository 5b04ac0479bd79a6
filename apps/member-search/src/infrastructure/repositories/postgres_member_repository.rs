use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::member::{Member, MemberId, NewMember};
use crate::domain::repositories::MemberRepository;
use crate::domain::team::TeamId;
use crate::errors::{QueryError, QueryResult};

type MemberRow = (MemberId, Option<String>, i32, Option<TeamId>);

fn into_member((id, username, age, team_id): MemberRow) -> Member {
    Member::from_persistence(id, username, age, team_id)
}

/// PostgreSQL implementation of MemberRepository
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Creates a new PostgresMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_team<'e, E>(executor: E, team_id: TeamId) -> QueryResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM teams WHERE id = $1)
            "#,
        )
        .bind(team_id)
        .fetch_one(executor)
        .await?;

        if !exists {
            return Err(QueryError::NotFound {
                entity: "Team",
                id: team_id.value(),
            });
        }
        Ok(())
    }

    async fn set_team(&self, member_id: MemberId, team_id: Option<TeamId>) -> QueryResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(team_id) = team_id {
            Self::require_team(&mut *tx, team_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE members SET team_id = $2
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueryError::NotFound {
                entity: "Member",
                id: member_id.value(),
            });
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn save(&self, member: NewMember) -> QueryResult<Member> {
        let mut tx = self.pool.begin().await?;

        if let Some(team_id) = member.team_id {
            Self::require_team(&mut *tx, team_id).await?;
        }

        let id = sqlx::query_scalar::<_, MemberId>(
            r#"
            INSERT INTO members (username, age, team_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&member.username)
        .bind(member.age)
        .bind(member.team_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(member_id = %id, "member saved");

        Ok(Member::from_persistence(
            id,
            member.username,
            member.age,
            member.team_id,
        ))
    }

    async fn find_by_id(&self, id: MemberId) -> QueryResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, username, age, team_id
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_member))
    }

    async fn find_all(&self) -> QueryResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, username, age, team_id
            FROM members
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_member).collect())
    }

    async fn find_by_username(&self, username: &str) -> QueryResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, username, age, team_id
            FROM members
            WHERE username = $1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_member).collect())
    }

    async fn change_team(&self, member_id: MemberId, team_id: TeamId) -> QueryResult<()> {
        self.set_team(member_id, Some(team_id)).await?;
        tracing::debug!(member_id = %member_id, team_id = %team_id, "member changed team");
        Ok(())
    }

    async fn leave_team(&self, member_id: MemberId) -> QueryResult<()> {
        self.set_team(member_id, None).await
    }

    async fn delete(&self, id: MemberId) -> QueryResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM members WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueryError::NotFound {
                entity: "Member",
                id: id.value(),
            });
        }

        tracing::debug!(member_id = %id, "member deleted");
        Ok(())
    }
}
