//! Row to DTO mapping
//!
//! Plain field extraction: team columns come from the joined team only, so a
//! left join that matched nothing yields `None` even if the member has a team
//! foreign key.

use super::engine::MemberTeamRow;
use super::projection::Cell;
use crate::domain::dto::{MemberDto, MemberTeamDto, UserDto};
use crate::domain::search::Page;
use crate::errors::{QueryError, QueryResult};

impl From<MemberTeamRow> for MemberTeamDto {
    fn from(row: MemberTeamRow) -> Self {
        let (team_id, team_name) = match row.team {
            Some(team) => (Some(team.id), Some(team.name)),
            None => (None, None),
        };

        Self {
            member_id: row.member_id,
            username: row.username,
            age: row.age,
            team_id,
            team_name,
        }
    }
}

impl From<&MemberTeamRow> for MemberDto {
    fn from(row: &MemberTeamRow) -> Self {
        Self {
            username: row.username.clone(),
            age: row.age,
        }
    }
}

impl From<&MemberTeamRow> for UserDto {
    fn from(row: &MemberTeamRow) -> Self {
        Self {
            name: row.username.clone(),
            age: f64::from(row.age),
        }
    }
}

/// `[name, age]` projected columns, e.g. a username and an age subquery
impl TryFrom<Vec<Cell>> for UserDto {
    type Error = QueryError;

    fn try_from(cells: Vec<Cell>) -> QueryResult<Self> {
        match cells.as_slice() {
            [name, age] => {
                let age = age.as_f64().ok_or_else(|| {
                    QueryError::InvalidComposition(format!("UserDto age must be numeric, got {:?}", age))
                })?;
                Ok(Self {
                    name: name.as_text().map(str::to_string),
                    age,
                })
            }
            _ => Err(QueryError::InvalidComposition(format!(
                "UserDto takes 2 columns, got {}",
                cells.len()
            ))),
        }
    }
}

pub fn materialize_users(rows: Vec<Vec<Cell>>) -> QueryResult<Vec<UserDto>> {
    rows.into_iter().map(UserDto::try_from).collect()
}

/// Consumes rows into a one-shot sequence of projections
pub fn materialize(rows: Vec<MemberTeamRow>) -> impl Iterator<Item = MemberTeamDto> {
    rows.into_iter().map(MemberTeamDto::from)
}

pub fn materialize_page(page: Page<MemberTeamRow>) -> Page<MemberTeamDto> {
    page.map(MemberTeamDto::from)
}
