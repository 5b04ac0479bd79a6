use std::fmt;
use std::marker::PhantomData;

use super::predicate::{AgeSubquery, CmpOp, Operand, Predicate};
use super::projection::ValueCase;
use crate::domain::member::MemberId;
use crate::domain::search::{Direction, NullHandling};
use crate::domain::team::TeamId;

/// Column addressable by a composed query
///
/// Team columns are only reachable through a team join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MemberId,
    Username,
    Age,
    TeamId,
    TeamName,
}

impl Field {
    pub fn is_team_field(&self) -> bool {
        matches!(self, Field::TeamId | Field::TeamName)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Field::Username | Field::TeamName)
    }

    /// Property name as used by sort requests and DTOs
    pub fn property(&self) -> &'static str {
        match self {
            Field::MemberId => "memberId",
            Field::Username => "username",
            Field::Age => "age",
            Field::TeamId => "teamId",
            Field::TeamName => "teamName",
        }
    }

    /// Resolves a sort property name
    pub fn from_property(name: &str) -> Option<Self> {
        match name {
            "id" | "memberId" => Some(Field::MemberId),
            "username" => Some(Field::Username),
            "age" => Some(Field::Age),
            "teamId" | "team.id" => Some(Field::TeamId),
            "teamName" | "team.name" => Some(Field::TeamName),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::MemberId => "member.id",
            Field::Username => "member.username",
            Field::Age => "member.age",
            Field::TeamId => "team.id",
            Field::TeamName => "team.name",
        };
        f.write_str(name)
    }
}

/// Literal bound into a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<MemberId> for Value {
    fn from(value: MemberId) -> Self {
        Value::Long(value.value())
    }
}

impl From<TeamId> for Value {
    fn from(value: TeamId) -> Self {
        Value::Long(value.value())
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpecifier {
    pub field: Field,
    pub direction: Direction,
    pub nulls: NullHandling,
}

impl OrderSpecifier {
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullHandling::NullsFirst;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullHandling::NullsLast;
        self
    }

    /// Whether NULLs sort ahead of values, after resolving `Native`
    pub fn nulls_come_first(&self) -> bool {
        match self.nulls {
            NullHandling::NullsFirst => true,
            NullHandling::NullsLast => false,
            NullHandling::Native => self.direction == Direction::Desc,
        }
    }
}

fn order(field: Field, direction: Direction) -> OrderSpecifier {
    OrderSpecifier {
        field,
        direction,
        nulls: NullHandling::Native,
    }
}

/// Typed path to a text column
#[derive(Debug, Clone, Copy)]
pub struct StringPath {
    field: Field,
}

impl StringPath {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn eq(&self, value: impl Into<String>) -> Predicate {
        Predicate::compare(self.field, CmpOp::Eq, Value::Text(value.into()))
    }

    pub fn ne(&self, value: impl Into<String>) -> Predicate {
        Predicate::compare(self.field, CmpOp::Ne, Value::Text(value.into()))
    }

    /// Compares against another column of the same row
    pub fn eq_path(&self, other: impl Into<Field>) -> Predicate {
        self.cmp_path(CmpOp::Eq, other)
    }

    pub fn cmp_path(&self, op: CmpOp, other: impl Into<Field>) -> Predicate {
        Predicate::Compare {
            field: self.field,
            op,
            rhs: Operand::Field(other.into()),
        }
    }

    pub fn in_<S: Into<String>>(&self, values: impl IntoIterator<Item = S>) -> Predicate {
        Predicate::In {
            field: self.field,
            values: values.into_iter().map(|v| Value::Text(v.into())).collect(),
        }
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.field)
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.field)
    }

    pub fn asc(&self) -> OrderSpecifier {
        order(self.field, Direction::Asc)
    }

    pub fn desc(&self) -> OrderSpecifier {
        order(self.field, Direction::Desc)
    }
}

/// Typed path to a numeric column holding `T`
#[derive(Debug, Clone, Copy)]
pub struct NumberPath<T> {
    field: Field,
    _marker: PhantomData<T>,
}

impl<T: Into<Value>> NumberPath<T> {
    fn new(field: Field) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn eq(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Eq, value.into())
    }

    pub fn ne(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Ne, value.into())
    }

    pub fn lt(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Lt, value.into())
    }

    pub fn loe(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Loe, value.into())
    }

    pub fn gt(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Gt, value.into())
    }

    pub fn goe(&self, value: T) -> Predicate {
        Predicate::compare(self.field, CmpOp::Goe, value.into())
    }

    /// Closed range `low <= field <= high`
    pub fn between(&self, low: T, high: T) -> Predicate {
        Predicate::Between {
            field: self.field,
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn in_(&self, values: impl IntoIterator<Item = T>) -> Predicate {
        Predicate::In {
            field: self.field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Compares against the scalar result of an age subquery
    pub fn cmp_subquery(&self, op: CmpOp, subquery: AgeSubquery) -> Predicate {
        Predicate::Compare {
            field: self.field,
            op,
            rhs: Operand::Subquery(Box::new(subquery)),
        }
    }

    /// `field IN (SELECT age ...)`
    pub fn in_subquery(&self, subquery: AgeSubquery) -> Predicate {
        Predicate::InSubquery {
            field: self.field,
            subquery: Box::new(subquery),
        }
    }

    pub fn cmp_path(&self, op: CmpOp, other: impl Into<Field>) -> Predicate {
        Predicate::Compare {
            field: self.field,
            op,
            rhs: Operand::Field(other.into()),
        }
    }

    /// `CASE field WHEN value THEN ...`
    pub fn case(&self) -> ValueCase<T> {
        ValueCase::new(self.field)
    }

    pub fn asc(&self) -> OrderSpecifier {
        order(self.field, Direction::Asc)
    }

    pub fn desc(&self) -> OrderSpecifier {
        order(self.field, Direction::Desc)
    }
}

impl From<StringPath> for Field {
    fn from(path: StringPath) -> Self {
        path.field
    }
}

impl<T> From<NumberPath<T>> for Field {
    fn from(path: NumberPath<T>) -> Self {
        path.field
    }
}

/// Paths on the member entity
pub mod member {
    use super::*;

    pub fn id() -> NumberPath<MemberId> {
        NumberPath::new(Field::MemberId)
    }

    pub fn username() -> StringPath {
        StringPath {
            field: Field::Username,
        }
    }

    pub fn age() -> NumberPath<i32> {
        NumberPath::new(Field::Age)
    }
}

/// Paths on the joined team
pub mod team {
    use super::*;

    pub fn id() -> NumberPath<TeamId> {
        NumberPath::new(Field::TeamId)
    }

    pub fn name() -> StringPath {
        StringPath {
            field: Field::TeamName,
        }
    }
}
