use serde::{Deserialize, Serialize};

use crate::domain::member::MemberId;
use crate::domain::team::TeamId;

/// Flat projection of a member and its joined team
///
/// The team columns are aliased (`team_id`, `team_name`) so they never clash
/// with the member's own id and name columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamDto {
    pub member_id: MemberId,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

/// Username and age only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

/// Member projected under different names: `username` becomes `name` and the
/// age is widened to a float
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub name: Option<String>,
    pub age: f64,
}
