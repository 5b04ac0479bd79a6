use std::fmt;

use super::path::{Field, Value};
use crate::errors::{QueryError, QueryResult};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Loe,
    Gt,
    Goe,
}

impl CmpOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Loe => "<=",
            CmpOp::Gt => ">",
            CmpOp::Goe => ">=",
        }
    }

    /// Applies the operator to an already-computed ordering of `lhs` vs `rhs`
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Eq => ordering == Equal,
            CmpOp::Ne => ordering != Equal,
            CmpOp::Lt => ordering == Less,
            CmpOp::Loe => ordering != Greater,
            CmpOp::Gt => ordering == Greater,
            CmpOp::Goe => ordering != Less,
        }
    }
}

/// Aggregate an age subquery reduces to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeAggregate {
    Max,
    Min,
    Avg,
}

impl AgeAggregate {
    pub fn as_sql(&self) -> &'static str {
        match self {
            AgeAggregate::Max => "MAX",
            AgeAggregate::Min => "MIN",
            AgeAggregate::Avg => "AVG",
        }
    }
}

/// Subquery over an independent scan of all members
///
/// With an aggregate it yields one scalar for comparisons; without one it
/// yields the list of matching ages for `IN`. Its filters may only reference
/// member columns and cannot nest another subquery.
///
/// # Example
/// ```
/// use member_search::query::path::member;
/// use member_search::query::predicate::{AgeSubquery, CmpOp};
///
/// // members whose age equals the oldest member's age
/// let oldest = member::age().cmp_subquery(CmpOp::Eq, AgeSubquery::max());
/// assert!(oldest.has_subquery());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AgeSubquery {
    pub aggregate: Option<AgeAggregate>,
    pub filters: Vec<Predicate>,
}

impl AgeSubquery {
    pub fn max() -> Self {
        Self::of(AgeAggregate::Max)
    }

    pub fn min() -> Self {
        Self::of(AgeAggregate::Min)
    }

    pub fn avg() -> Self {
        Self::of(AgeAggregate::Avg)
    }

    /// Every matching age, for `age IN (...)`
    pub fn ages() -> Self {
        Self {
            aggregate: None,
            filters: Vec::new(),
        }
    }

    fn of(aggregate: AgeAggregate) -> Self {
        Self {
            aggregate: Some(aggregate),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Subqueries used where one value is expected must aggregate
    pub(crate) fn validate_scalar(&self) -> QueryResult<()> {
        if self.aggregate.is_none() {
            return Err(QueryError::InvalidComposition(
                "a list subquery cannot be used as a single value".to_string(),
            ));
        }
        self.validate()
    }

    fn validate(&self) -> QueryResult<()> {
        for predicate in &self.filters {
            if predicate.references_team() {
                return Err(QueryError::InvalidComposition(
                    "subquery filters cannot reference team columns".to_string(),
                ));
            }
            if predicate.has_subquery() {
                return Err(QueryError::InvalidComposition(
                    "subqueries cannot be nested".to_string(),
                ));
            }
            predicate.validate_columns()?;
        }
        Ok(())
    }
}

impl fmt::Display for AgeSubquery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.aggregate {
            Some(aggregate) => write!(
                f,
                "(select {}(age) from member",
                aggregate.as_sql().to_lowercase()
            )?,
            None => f.write_str("(select age from member")?,
        }
        if !self.filters.is_empty() {
            f.write_str(" where ")?;
            write_joined(f, &self.filters, " and ")?;
        }
        f.write_str(")")
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Another column of the same row, e.g. `member.username = team.name`
    Field(Field),
    Subquery(Box<AgeSubquery>),
}

/// Boolean condition over one member row (and its joined team)
///
/// Evaluated with SQL three-valued logic: comparing against NULL is unknown
/// and rows whose filter is unknown are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        field: Field,
        op: CmpOp,
        rhs: Operand,
    },
    Between {
        field: Field,
        low: Value,
        high: Value,
    },
    In {
        field: Field,
        values: Vec<Value>,
    },
    InSubquery {
        field: Field,
        subquery: Box<AgeSubquery>,
    },
    IsNull(Field),
    IsNotNull(Field),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(field: Field, op: CmpOp, value: Value) -> Self {
        Predicate::Compare {
            field,
            op,
            rhs: Operand::Value(value),
        }
    }

    /// Conjunction, flattening nested ANDs
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), right) => {
                left.push(right);
                Predicate::And(left)
            }
            (left, Predicate::And(mut right)) => {
                right.insert(0, left);
                Predicate::And(right)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    /// Disjunction, flattening nested ORs
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), right) => {
                left.push(right);
                Predicate::Or(left)
            }
            (left, right) => Predicate::Or(vec![left, right]),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// True if any column outside a subquery belongs to the joined team
    pub fn references_team(&self) -> bool {
        match self {
            Predicate::Compare {
                field,
                rhs: Operand::Field(other),
                ..
            } => field.is_team_field() || other.is_team_field(),
            Predicate::Compare { field, .. }
            | Predicate::Between { field, .. }
            | Predicate::In { field, .. }
            | Predicate::InSubquery { field, .. } => field.is_team_field(),
            Predicate::IsNull(field) | Predicate::IsNotNull(field) => field.is_team_field(),
            Predicate::And(parts) | Predicate::Or(parts) => {
                parts.iter().any(Predicate::references_team)
            }
            Predicate::Not(inner) => inner.references_team(),
        }
    }

    pub fn has_subquery(&self) -> bool {
        match self {
            Predicate::Compare {
                rhs: Operand::Subquery(_),
                ..
            }
            | Predicate::InSubquery { .. } => true,
            Predicate::And(parts) | Predicate::Or(parts) => parts.iter().any(Predicate::has_subquery),
            Predicate::Not(inner) => inner.has_subquery(),
            _ => false,
        }
    }

    /// Checks every subquery and column comparison reachable from this predicate
    pub fn validate(&self) -> QueryResult<()> {
        match self {
            Predicate::Compare {
                field,
                rhs: Operand::Subquery(subquery),
                ..
            } => {
                require_numeric(*field)?;
                subquery.validate_scalar()
            }
            Predicate::InSubquery { field, subquery } => {
                require_numeric(*field)?;
                subquery.validate()
            }
            Predicate::And(parts) | Predicate::Or(parts) => parts
                .iter()
                .try_for_each(Predicate::validate),
            Predicate::Not(inner) => inner.validate(),
            _ => self.validate_columns(),
        }
    }

    /// Column-to-column comparisons need both sides of the same kind
    fn validate_columns(&self) -> QueryResult<()> {
        match self {
            Predicate::Compare {
                field,
                rhs: Operand::Field(other),
                ..
            } if field.is_text() != other.is_text() => Err(QueryError::InvalidComposition(
                format!("{} and {} are not comparable", field, other),
            )),
            Predicate::And(parts) | Predicate::Or(parts) => {
                parts.iter().try_for_each(Predicate::validate_columns)
            }
            Predicate::Not(inner) => inner.validate_columns(),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, rhs } => match rhs {
                Operand::Value(value) => write!(f, "{} {} {}", field, op.as_sql(), value),
                Operand::Field(other) => write!(f, "{} {} {}", field, op.as_sql(), other),
                Operand::Subquery(sub) => write!(f, "{} {} {}", field, op.as_sql(), sub),
            },
            Predicate::Between { field, low, high } => {
                write!(f, "{} between {} and {}", field, low, high)
            }
            Predicate::In { field, values } => {
                let list = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} in ({})", field, list)
            }
            Predicate::InSubquery { field, subquery } => write!(f, "{} in {}", field, subquery),
            Predicate::IsNull(field) => write!(f, "{} is null", field),
            Predicate::IsNotNull(field) => write!(f, "{} is not null", field),
            Predicate::And(parts) => write_joined(f, parts, " and "),
            Predicate::Or(parts) => write_joined(f, parts, " or "),
            Predicate::Not(inner) => write!(f, "not ({})", inner),
        }
    }
}

fn require_numeric(field: Field) -> QueryResult<()> {
    if field.is_text() {
        return Err(QueryError::InvalidComposition(format!(
            "{} cannot be compared with member ages",
            field
        )));
    }
    Ok(())
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", part)?;
    }
    f.write_str(")")
}
