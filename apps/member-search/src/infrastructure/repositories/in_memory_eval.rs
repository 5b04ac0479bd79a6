//! Query evaluation over a [`Roster`] snapshot
//!
//! Mirrors what the PostgreSQL engine asks the database to do: join, filter
//! with three-valued logic, order with PostgreSQL null placement, then window.
//!
//! Text compares in byte order (`str` ordering). The SQL renderer applies
//! `COLLATE "C"` wherever text is ordered or range-compared, so both engines
//! agree whatever collation the database defaults to.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::member::Member;
use crate::domain::roster::Roster;
use crate::domain::search::Direction;
use crate::domain::team::Team;
use crate::query::composer::{JoinKind, MemberQuery};
use crate::query::engine::{AgeStats, JoinedTeam, MemberTeamRow, TeamAgeAverage};
use crate::query::path::{Field, OrderSpecifier, Value};
use crate::query::predicate::{AgeAggregate, AgeSubquery, Operand, Predicate};
use crate::query::projection::{Cell, Expr};

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Num(f64),
    Text(String),
}

fn field_value(row: &MemberTeamRow, field: Field) -> Option<Scalar> {
    match field {
        Field::MemberId => Some(Scalar::Num(row.member_id.value() as f64)),
        Field::Username => row.username.clone().map(Scalar::Text),
        Field::Age => Some(Scalar::Num(f64::from(row.age))),
        Field::TeamId => row
            .team
            .as_ref()
            .map(|team| Scalar::Num(team.id.value() as f64)),
        Field::TeamName => row
            .team
            .as_ref()
            .map(|team| Scalar::Text(team.name.clone())),
    }
}

fn field_cell(row: &MemberTeamRow, field: Field) -> Cell {
    match field {
        Field::MemberId => Cell::Long(row.member_id.value()),
        Field::Username => row.username.clone().map_or(Cell::Null, Cell::Text),
        Field::Age => Cell::Long(i64::from(row.age)),
        Field::TeamId => row
            .team
            .as_ref()
            .map_or(Cell::Null, |team| Cell::Long(team.id.value())),
        Field::TeamName => row
            .team
            .as_ref()
            .map_or(Cell::Null, |team| Cell::Text(team.name.clone())),
    }
}

fn literal(value: &Value) -> Scalar {
    match value {
        Value::Int(v) => Scalar::Num(f64::from(*v)),
        Value::Long(v) => Scalar::Num(*v as f64),
        Value::Text(v) => Scalar::Text(v.clone()),
    }
}

fn compare(lhs: &Scalar, rhs: &Scalar) -> Option<Ordering> {
    match (lhs, rhs) {
        (Scalar::Num(a), Scalar::Num(b)) => a.partial_cmp(b),
        (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn bare_row(member: &Member) -> MemberTeamRow {
    MemberTeamRow {
        member_id: member.id(),
        username: member.username().map(str::to_string),
        age: member.age(),
        member_team_id: member.team_id(),
        team: None,
    }
}

fn joined(bare: &MemberTeamRow, team: &Team) -> MemberTeamRow {
    MemberTeamRow {
        team: Some(JoinedTeam {
            id: team.id(),
            name: team.name().to_string(),
        }),
        ..bare.clone()
    }
}

/// Predicate evaluation against rows of one roster
pub(crate) struct Evaluator<'a> {
    roster: &'a Roster,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    /// `None` is SQL's unknown
    fn test(&self, predicate: &Predicate, row: &MemberTeamRow) -> Option<bool> {
        match predicate {
            Predicate::Compare { field, op, rhs } => {
                let lhs = field_value(row, *field)?;
                let rhs = self.operand(rhs, row)?;
                compare(&lhs, &rhs).map(|ordering| op.holds(ordering))
            }
            Predicate::Between { field, low, high } => {
                let value = field_value(row, *field)?;
                let above = compare(&value, &literal(low))?;
                let below = compare(&value, &literal(high))?;
                Some(above != Ordering::Less && below != Ordering::Greater)
            }
            Predicate::In { field, values } => {
                let value = field_value(row, *field)?;
                Some(
                    values
                        .iter()
                        .any(|candidate| compare(&value, &literal(candidate)) == Some(Ordering::Equal)),
                )
            }
            Predicate::InSubquery { field, subquery } => {
                let value = field_value(row, *field)?;
                let candidates = match subquery.aggregate {
                    Some(_) => self.subquery(subquery).into_iter().collect(),
                    None => self.subquery_ages(subquery),
                };
                Some(
                    candidates
                        .into_iter()
                        .any(|age| compare(&value, &Scalar::Num(age)) == Some(Ordering::Equal)),
                )
            }
            Predicate::IsNull(field) => Some(field_value(row, *field).is_none()),
            Predicate::IsNotNull(field) => Some(field_value(row, *field).is_some()),
            Predicate::And(parts) => {
                let mut unknown = false;
                for part in parts {
                    match self.test(part, row) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                (!unknown).then_some(true)
            }
            Predicate::Or(parts) => {
                let mut unknown = false;
                for part in parts {
                    match self.test(part, row) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                (!unknown).then_some(false)
            }
            Predicate::Not(inner) => self.test(inner, row).map(|b| !b),
        }
    }

    fn matches_all(&self, predicates: &[Predicate], row: &MemberTeamRow) -> bool {
        predicates
            .iter()
            .all(|predicate| self.test(predicate, row) == Some(true))
    }

    fn operand(&self, operand: &Operand, row: &MemberTeamRow) -> Option<Scalar> {
        match operand {
            Operand::Value(value) => Some(literal(value)),
            Operand::Field(field) => field_value(row, *field),
            Operand::Subquery(subquery) => self.subquery(subquery).map(Scalar::Num),
        }
    }

    fn subquery_ages(&self, subquery: &AgeSubquery) -> Vec<f64> {
        self.roster
            .members()
            .map(bare_row)
            .filter(|row| self.matches_all(&subquery.filters, row))
            .map(|row| f64::from(row.age))
            .collect()
    }

    /// Aggregated scalar; `None` when no member matches
    fn subquery(&self, subquery: &AgeSubquery) -> Option<f64> {
        let ages = self.subquery_ages(subquery);
        if ages.is_empty() {
            return None;
        }

        Some(match subquery.aggregate? {
            AgeAggregate::Max => ages.iter().copied().fold(f64::MIN, f64::max),
            AgeAggregate::Min => ages.iter().copied().fold(f64::MAX, f64::min),
            AgeAggregate::Avg => ages.iter().sum::<f64>() / ages.len() as f64,
        })
    }

    /// Teams a member may pair with before the ON conditions are applied
    fn join_candidates(&self, member: &Member, related: bool) -> Vec<&'a Team> {
        if related {
            member
                .team_id()
                .and_then(|id| self.roster.team(id))
                .into_iter()
                .collect()
        } else {
            self.roster.teams().collect()
        }
    }

    /// Joined and filtered rows in member id then team id order, before
    /// ordering and paging
    pub(crate) fn matching_rows(&self, query: &MemberQuery) -> Vec<MemberTeamRow> {
        let mut rows = Vec::new();
        for member in self.roster.members() {
            let bare = bare_row(member);

            let Some(kind) = query.join_kind() else {
                if self.matches_all(query.filters(), &bare) {
                    rows.push(bare);
                }
                continue;
            };

            let mut paired: Vec<MemberTeamRow> = self
                .join_candidates(member, query.joins_by_relation())
                .into_iter()
                .map(|team| joined(&bare, team))
                .filter(|row| self.matches_all(query.join_on(), row))
                .collect();
            if paired.is_empty() && kind == JoinKind::Left {
                paired.push(bare);
            }

            rows.extend(
                paired
                    .into_iter()
                    .filter(|row| self.matches_all(query.filters(), row)),
            );
        }
        rows
    }

    /// Value of one projected column for `row`
    pub(crate) fn project(&self, expr: &Expr, row: &MemberTeamRow) -> Cell {
        match expr {
            Expr::Field(field) => field_cell(row, *field),
            Expr::Constant(Value::Int(v)) => Cell::Long(i64::from(*v)),
            Expr::Constant(Value::Long(v)) => Cell::Long(*v),
            Expr::Constant(Value::Text(v)) => Cell::Text(v.clone()),
            Expr::Concat(parts) => Cell::Text(
                parts
                    .iter()
                    .map(|part| self.project(part, row).concat_text())
                    .collect(),
            ),
            Expr::Case {
                branches,
                otherwise,
            } => {
                let chosen = branches
                    .iter()
                    .find(|(condition, _)| self.test(condition, row) == Some(true))
                    .map_or(otherwise.as_ref(), |(_, result)| result);
                self.project(chosen, row)
            }
            Expr::Subquery(subquery) => match (subquery.aggregate, self.subquery(subquery)) {
                (_, None) => Cell::Null,
                (Some(AgeAggregate::Avg), Some(avg)) => Cell::Double(avg),
                (_, Some(value)) => Cell::Long(value as i64),
            },
        }
    }
}

fn compare_by(order: &OrderSpecifier, a: &MemberTeamRow, b: &MemberTeamRow) -> Ordering {
    match (field_value(a, order.field), field_value(b, order.field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) if order.nulls_come_first() => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) if order.nulls_come_first() => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ordering = compare(&x, &y).unwrap_or(Ordering::Equal);
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        }
    }
}

/// Joined team id ascending with unmatched rows last
fn joined_team_order(a: &MemberTeamRow, b: &MemberTeamRow) -> Ordering {
    match (&a.team, &b.team) {
        (Some(x), Some(y)) => x.id.cmp(&y.id),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Applies explicit orders, then member id and joined team id ascending
pub(crate) fn sort_rows(rows: &mut [MemberTeamRow], orders: &[OrderSpecifier]) {
    rows.sort_by(|a, b| {
        orders
            .iter()
            .map(|order| compare_by(order, a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| {
                a.member_id
                    .cmp(&b.member_id)
                    .then_with(|| joined_team_order(a, b))
            })
    });
}

pub(crate) fn window(rows: Vec<MemberTeamRow>, offset: Option<u64>, limit: Option<u64>) -> Vec<MemberTeamRow> {
    let skip = offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
    let take = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
    rows.into_iter().skip(skip).take(take).collect()
}

pub(crate) fn age_stats(rows: &[MemberTeamRow]) -> AgeStats {
    let count = rows.len() as u64;
    if rows.is_empty() {
        return AgeStats {
            count,
            sum: None,
            avg: None,
            max: None,
            min: None,
        };
    }

    let sum: i64 = rows.iter().map(|row| i64::from(row.age)).sum();
    AgeStats {
        count,
        sum: Some(sum),
        avg: Some(sum as f64 / count as f64),
        max: rows.iter().map(|row| row.age).max(),
        min: rows.iter().map(|row| row.age).min(),
    }
}

/// Team name groups, ordered by name with the no-team group last
pub(crate) fn average_age_by_team(rows: &[MemberTeamRow]) -> Vec<TeamAgeAverage> {
    let mut groups: HashMap<Option<String>, (i64, u64)> = HashMap::new();
    for row in rows {
        let entry = groups
            .entry(row.team.as_ref().map(|team| team.name.clone()))
            .or_insert((0, 0));
        entry.0 += i64::from(row.age);
        entry.1 += 1;
    }

    let mut averages: Vec<TeamAgeAverage> = groups
        .into_iter()
        .map(|(team_name, (sum, count))| TeamAgeAverage {
            team_name,
            average_age: sum as f64 / count as f64,
        })
        .collect();

    averages.sort_by(|a, b| match (&a.team_name, &b.team_name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    averages
}
