use async_trait::async_trait;

use crate::domain::team::{NewTeam, Team, TeamId};
use crate::errors::QueryResult;

/// Repository trait for the Team entity
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Persist a new team and return it with its assigned id
    async fn save(&self, team: NewTeam) -> QueryResult<Team>;

    /// Find a team by its ID, with its current member list
    async fn find_by_id(&self, id: TeamId) -> QueryResult<Option<Team>>;

    /// Find the single team with this name
    ///
    /// Returns `Ok(None)` when there is none and
    /// [`QueryError::NonUniqueResult`](crate::errors::QueryError::NonUniqueResult)
    /// when the name is shared.
    async fn find_by_name(&self, name: &str) -> QueryResult<Option<Team>>;

    /// All teams in id order
    async fn find_all(&self) -> QueryResult<Vec<Team>>;
}
