use serde::{Deserialize, Serialize};

/// Optional filters for a member search
///
/// Every field is optional and an absent field leaves the search
/// unconstrained on that column. Empty strings are treated as absent when the
/// condition is turned into predicates.
///
/// # Example
/// ```
/// use member_search::domain::search::MemberSearchCondition;
///
/// let condition = MemberSearchCondition::default()
///     .with_username("member4")
///     .with_age_goe(32)
///     .with_age_loe(40);
///
/// assert_eq!(condition.username.as_deref(), Some("member4"));
/// assert!(condition.team_name.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub team_name: Option<String>,
    pub age_goe: Option<i32>,
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }
}
