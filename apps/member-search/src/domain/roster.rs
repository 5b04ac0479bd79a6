use std::collections::BTreeMap;

use crate::domain::member::{Member, MemberId, NewMember};
use crate::domain::team::{NewTeam, Team, TeamId};
use crate::errors::{QueryError, QueryResult};

/// Arena of members and teams addressed by id
///
/// Members and teams never hold references to each other; the member side
/// stores a `TeamId` and the team side stores the inverse list of
/// `MemberId`s. Both sides are only changed together, by
/// [`Roster::change_team`] and [`Roster::leave_team`].
///
/// Ids come from one counter shared by both entity kinds, starting at 1.
///
/// # Example
/// ```
/// use member_search::domain::member::NewMember;
/// use member_search::domain::roster::Roster;
/// use member_search::domain::team::NewTeam;
///
/// let mut roster = Roster::new();
/// let team_a = roster.add_team(NewTeam::new("teamA"));
/// let member = roster.add_member(NewMember::new("member1", 10).in_team(team_a)).unwrap();
///
/// assert_eq!(roster.member(member).unwrap().team_id(), Some(team_a));
/// assert!(roster.team(team_a).unwrap().has_member(member));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Roster {
    members: BTreeMap<MemberId, Member>,
    teams: BTreeMap<TeamId, Team>,
    last_id: i64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn add_team(&mut self, team: NewTeam) -> TeamId {
        let id = TeamId::new(self.next_id());
        self.teams.insert(id, Team::new(id, team.name));
        id
    }

    /// Inserts a member, joining the requested team if any
    ///
    /// The team is checked before anything is inserted so a missing team
    /// leaves the roster untouched.
    pub fn add_member(&mut self, member: NewMember) -> QueryResult<MemberId> {
        if let Some(team_id) = member.team_id {
            self.require_team(team_id)?;
        }

        let id = MemberId::new(self.next_id());
        self.members
            .insert(id, Member::new(id, member.username, member.age));

        if let Some(team_id) = member.team_id {
            self.change_team(id, team_id)?;
        }

        Ok(id)
    }

    /// Assigns a member to a team, keeping both sides of the relation in step
    ///
    /// The member is removed from its previous team's list and appended to the
    /// new team's list exactly once. Re-assigning to the current team is a
    /// no-op.
    pub fn change_team(&mut self, member_id: MemberId, team_id: TeamId) -> QueryResult<()> {
        self.require_team(team_id)?;
        let previous = self
            .members
            .get(&member_id)
            .ok_or_else(|| not_found_member(member_id))?
            .team_id;

        if let Some(previous) = previous.filter(|previous| *previous != team_id) {
            if let Some(team) = self.teams.get_mut(&previous) {
                team.detach(member_id);
            }
        }

        if let Some(member) = self.members.get_mut(&member_id) {
            member.team_id = Some(team_id);
        }
        if let Some(team) = self.teams.get_mut(&team_id) {
            team.attach(member_id);
        }

        Ok(())
    }

    /// Clears a member's team reference and removes it from that team's list
    pub fn leave_team(&mut self, member_id: MemberId) -> QueryResult<()> {
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| not_found_member(member_id))?;

        if let Some(previous) = member.team_id.take() {
            if let Some(team) = self.teams.get_mut(&previous) {
                team.detach(member_id);
            }
        }

        Ok(())
    }

    pub fn remove_member(&mut self, member_id: MemberId) -> QueryResult<Member> {
        self.leave_team(member_id)?;
        self.members
            .remove(&member_id)
            .ok_or_else(|| not_found_member(member_id))
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.get_mut(&id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Members in id (insertion) order
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Teams in id (insertion) order
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn require_team(&self, team_id: TeamId) -> QueryResult<()> {
        if self.teams.contains_key(&team_id) {
            Ok(())
        } else {
            Err(QueryError::NotFound {
                entity: "Team",
                id: team_id.value(),
            })
        }
    }
}

fn not_found_member(id: MemberId) -> QueryError {
    QueryError::NotFound {
        entity: "Member",
        id: id.value(),
    }
}
