//! Optional predicate fragments for member searches
//!
//! Each helper turns one optional search field into `Some(predicate)` or
//! `None`. `None` means "no constraint" and is dropped by the composer; it is
//! never replaced with an always-true predicate. Empty strings count as
//! absent.

use super::path::{member, team};
use super::predicate::Predicate;
use crate::domain::search::MemberSearchCondition;

fn has_text(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// `member.username = value`, or `None` when unset or empty
pub fn username_eq(username: Option<&str>) -> Option<Predicate> {
    has_text(username).map(|v| member::username().eq(v))
}

/// `team.name = value`, or `None` when unset or empty
///
/// The resulting predicate needs a team join in the composed query.
pub fn team_name_eq(team_name: Option<&str>) -> Option<Predicate> {
    has_text(team_name).map(|v| team::name().eq(v))
}

/// `member.age <= age`, or `None` when unset
pub fn age_loe(age: Option<i32>) -> Option<Predicate> {
    age.map(|v| member::age().loe(v))
}

/// `member.age >= age`, or `None` when unset
pub fn age_goe(age: Option<i32>) -> Option<Predicate> {
    age.map(|v| member::age().goe(v))
}

/// The four search fragments, in a fixed order, absent ones included as `None`
pub fn condition_fragments(condition: &MemberSearchCondition) -> Vec<Option<Predicate>> {
    vec![
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_goe(condition.age_goe),
        age_loe(condition.age_loe),
    ]
}

/// Folds present fragments with AND; `None` if nothing is present
///
/// # Example
/// ```
/// use member_search::query::fragments::{age_goe, all_of, username_eq};
///
/// assert!(all_of([username_eq(Some("")), age_goe(None)]).is_none());
///
/// let combined = all_of([username_eq(Some("member1")), age_goe(Some(10))]).unwrap();
/// assert_eq!(
///     combined.to_string(),
///     "(member.username = 'member1' and member.age >= 10)"
/// );
/// ```
pub fn all_of(fragments: impl IntoIterator<Item = Option<Predicate>>) -> Option<Predicate> {
    fragments
        .into_iter()
        .flatten()
        .fold(None, |acc, next| match acc {
            None => Some(next),
            Some(acc) => Some(acc.and(next)),
        })
}
