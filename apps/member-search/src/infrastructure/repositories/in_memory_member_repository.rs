use async_trait::async_trait;

use super::in_memory_database::InMemoryDatabase;
use crate::domain::member::{Member, MemberId, NewMember};
use crate::domain::repositories::MemberRepository;
use crate::domain::team::TeamId;
use crate::errors::{QueryError, QueryResult};

/// In-memory implementation of MemberRepository
///
/// Team membership changes go through [`Roster::change_team`](crate::domain::roster::Roster::change_team)
/// under the write lock.
#[derive(Debug, Clone)]
pub struct InMemoryMemberRepository {
    db: InMemoryDatabase,
}

impl InMemoryMemberRepository {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn save(&self, member: NewMember) -> QueryResult<Member> {
        let mut roster = self.db.write().await;
        let id = roster.add_member(member)?;
        tracing::debug!(member_id = %id, "member saved");

        roster.member(id).cloned().ok_or(QueryError::NotFound {
            entity: "Member",
            id: id.value(),
        })
    }

    async fn find_by_id(&self, id: MemberId) -> QueryResult<Option<Member>> {
        Ok(self.db.read().await.member(id).cloned())
    }

    async fn find_all(&self) -> QueryResult<Vec<Member>> {
        Ok(self.db.read().await.members().cloned().collect())
    }

    async fn find_by_username(&self, username: &str) -> QueryResult<Vec<Member>> {
        Ok(self
            .db
            .read()
            .await
            .members()
            .filter(|member| member.username() == Some(username))
            .cloned()
            .collect())
    }

    async fn change_team(&self, member_id: MemberId, team_id: TeamId) -> QueryResult<()> {
        self.db.write().await.change_team(member_id, team_id)?;
        tracing::debug!(member_id = %member_id, team_id = %team_id, "member changed team");
        Ok(())
    }

    async fn leave_team(&self, member_id: MemberId) -> QueryResult<()> {
        self.db.write().await.leave_team(member_id)
    }

    async fn delete(&self, id: MemberId) -> QueryResult<()> {
        self.db.write().await.remove_member(id)?;
        tracing::debug!(member_id = %id, "member deleted");
        Ok(())
    }
}
