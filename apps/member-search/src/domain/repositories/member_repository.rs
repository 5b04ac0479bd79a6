use async_trait::async_trait;

use crate::domain::member::{Member, MemberId, NewMember};
use crate::domain::team::TeamId;
use crate::errors::QueryResult;

/// Repository trait for the Member entity
///
/// [`change_team`](MemberRepository::change_team) is the only way to move a
/// member between teams; implementations keep the team's member list in step
/// with it.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Persist a new member, joining its requested team if any
    async fn save(&self, member: NewMember) -> QueryResult<Member>;

    async fn find_by_id(&self, id: MemberId) -> QueryResult<Option<Member>>;

    /// All members in id order
    async fn find_all(&self) -> QueryResult<Vec<Member>>;

    async fn find_by_username(&self, username: &str) -> QueryResult<Vec<Member>>;

    /// Move a member to `team_id`, leaving any previous team
    async fn change_team(&self, member_id: MemberId, team_id: TeamId) -> QueryResult<()>;

    /// Clear a member's team
    async fn leave_team(&self, member_id: MemberId) -> QueryResult<()>;

    /// Delete a member; fails with `NotFound` if it does not exist
    async fn delete(&self, id: MemberId) -> QueryResult<()>;
}
