use async_trait::async_trait;

use super::in_memory_database::InMemoryDatabase;
use crate::domain::repositories::TeamRepository;
use crate::domain::team::{NewTeam, Team, TeamId};
use crate::errors::{QueryError, QueryResult};

/// In-memory implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct InMemoryTeamRepository {
    db: InMemoryDatabase,
}

impl InMemoryTeamRepository {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn save(&self, team: NewTeam) -> QueryResult<Team> {
        let mut roster = self.db.write().await;
        let id = roster.add_team(team);
        tracing::debug!(team_id = %id, "team saved");

        roster.team(id).cloned().ok_or(QueryError::NotFound {
            entity: "Team",
            id: id.value(),
        })
    }

    async fn find_by_id(&self, id: TeamId) -> QueryResult<Option<Team>> {
        Ok(self.db.read().await.team(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> QueryResult<Option<Team>> {
        let roster = self.db.read().await;
        let mut matches: Vec<Team> = roster
            .teams()
            .filter(|team| team.name() == name)
            .cloned()
            .collect();

        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            n => Err(QueryError::NonUniqueResult(n)),
        }
    }

    async fn find_all(&self) -> QueryResult<Vec<Team>> {
        Ok(self.db.read().await.teams().cloned().collect())
    }
}
