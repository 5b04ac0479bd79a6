use super::value_objects::TeamId;
use crate::domain::member::MemberId;

/// A team that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Team entity
///
/// Owns the inverse side of the member/team relation. The member list is a
/// read-only view of `Member::team_id`; it only changes through
/// [`Roster::change_team`](crate::domain::roster::Roster::change_team) or,
/// for PostgreSQL, by being recomputed from the `members.team_id` column.
///
/// # Invariants
/// - A member id appears at most once in `member_ids`
/// - Every listed member points back at this team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: TeamId,
    name: String,
    pub(crate) member_ids: Vec<MemberId>,
}

impl Team {
    pub(crate) fn new(id: TeamId, name: String) -> Self {
        Self {
            id,
            name,
            member_ids: Vec::new(),
        }
    }

    // ===== Getters =====

    /// Returns the team's ID
    pub fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the team's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the members currently assigned to this team, in assignment order
    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_ids
    }

    /// Returns true if the given member is assigned to this team
    pub fn has_member(&self, member_id: MemberId) -> bool {
        self.member_ids.contains(&member_id)
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Only to be used by repository implementations; the member list must
    /// already be the inverse of the stored `team_id` column.
    pub fn from_persistence(id: TeamId, name: String, member_ids: Vec<MemberId>) -> Self {
        Self {
            id,
            name,
            member_ids,
        }
    }

    pub(crate) fn attach(&mut self, member_id: MemberId) {
        if !self.member_ids.contains(&member_id) {
            self.member_ids.push(member_id);
        }
    }

    pub(crate) fn detach(&mut self, member_id: MemberId) {
        self.member_ids.retain(|id| *id != member_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_is_idempotent() {
        let mut team = Team::new(TeamId::new(1), "teamA".to_string());
        team.attach(MemberId::new(2));
        team.attach(MemberId::new(2));

        assert_eq!(team.member_ids(), &[MemberId::new(2)]);
    }

    #[test]
    fn detach_removes_member() {
        let mut team = Team::new(TeamId::new(1), "teamA".to_string());
        team.attach(MemberId::new(2));
        team.attach(MemberId::new(3));
        team.detach(MemberId::new(2));

        assert!(!team.has_member(MemberId::new(2)));
        assert!(team.has_member(MemberId::new(3)));
    }

    #[test]
    fn from_persistence_keeps_member_order() {
        let team = Team::from_persistence(
            TeamId::new(9),
            "teamB".to_string(),
            vec![MemberId::new(4), MemberId::new(5)],
        );

        assert_eq!(team.name(), "teamB");
        assert_eq!(team.member_ids(), &[MemberId::new(4), MemberId::new(5)]);
    }
}
