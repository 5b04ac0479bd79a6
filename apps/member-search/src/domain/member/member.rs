use super::value_objects::MemberId;
use crate::domain::team::TeamId;

/// A member that has not been persisted yet
///
/// # Example
/// ```
/// use member_search::domain::member::NewMember;
/// use member_search::domain::team::TeamId;
///
/// let member = NewMember::new("member1", 10).in_team(TeamId::new(1));
/// assert_eq!(member.username.as_deref(), Some("member1"));
/// assert_eq!(member.team_id, Some(TeamId::new(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl NewMember {
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: Some(username.into()),
            age,
            team_id: None,
        }
    }

    /// Member with the default age of zero
    pub fn with_age_default(username: impl Into<String>) -> Self {
        Self::new(username, 0)
    }

    /// Member without a username
    pub fn anonymous(age: i32) -> Self {
        Self {
            username: None,
            age,
            team_id: None,
        }
    }

    /// Requests that the member join `team_id` when it is saved
    ///
    /// The assignment itself happens in the repository, through the same
    /// path as [`MemberRepository::change_team`](crate::domain::repositories::MemberRepository::change_team).
    pub fn in_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

/// Member entity
///
/// Owning side of the member/team relation. There is deliberately no public
/// setter for the team reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    username: Option<String>,
    age: i32,
    pub(crate) team_id: Option<TeamId>,
}

impl Member {
    pub(crate) fn new(id: MemberId, username: Option<String>, age: i32) -> Self {
        Self {
            id,
            username,
            age,
            team_id: None,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    pub(crate) fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub(crate) fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    /// Reconstructs a Member from persistence layer data
    pub fn from_persistence(
        id: MemberId,
        username: Option<String>,
        age: i32,
        team_id: Option<TeamId>,
    ) -> Self {
        Self {
            id,
            username,
            age,
            team_id,
        }
    }
}
