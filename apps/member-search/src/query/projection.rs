//! Select expressions beyond whole rows
//!
//! A projection is a list of [`Expr`] columns evaluated for every matching
//! row: plain columns, constants, string concatenation, `CASE`, and scalar
//! age subqueries. Each column has a static [`CellType`] so both engines hand
//! back the same kind of [`Cell`] for it.
//!
//! # Example
//! ```
//! use member_search::query::path::member;
//! use member_search::query::projection::{CellType, Expr};
//!
//! let label = Expr::from(member::username()).concat("_").concat(member::age());
//! let bracket = Expr::case_when(member::age().between(0, 30))
//!     .then("0~30")
//!     .otherwise("31~");
//!
//! assert_eq!(label.result_type().unwrap(), CellType::Text);
//! assert_eq!(bracket.result_type().unwrap(), CellType::Text);
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use super::composer::MemberQuery;
use super::path::{Field, NumberPath, StringPath, Value};
use super::predicate::{AgeAggregate, AgeSubquery, CmpOp, Operand, Predicate};
use crate::errors::{QueryError, QueryResult};

/// One projected column
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(Field),
    Constant(Value),
    /// String concatenation; NULL parts contribute nothing
    Concat(Vec<Expr>),
    /// First branch whose condition holds, else `otherwise`
    Case {
        branches: Vec<(Predicate, Expr)>,
        otherwise: Box<Expr>,
    },
    /// Scalar age subquery over all members
    Subquery(Box<AgeSubquery>),
}

/// Static type of a projected column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Long,
    Double,
    Text,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellType::Long => "integer",
            CellType::Double => "float",
            CellType::Text => "text",
        })
    }
}

/// One projected value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Long(i64),
    Double(f64),
    Text(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Cell::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric cells widened to a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Long(value) => Some(*value as f64),
            Cell::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text as concatenation sees it: NULL becomes empty
    pub(crate) fn concat_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Long(value) => value.to_string(),
            Cell::Double(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
        }
    }
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn subquery(subquery: AgeSubquery) -> Self {
        Expr::Subquery(Box::new(subquery))
    }

    /// Starts a searched `CASE WHEN condition THEN ...`
    pub fn case_when(condition: Predicate) -> CaseWhen {
        CaseWhen {
            branches: Vec::new(),
            condition,
        }
    }

    /// Appends `other`, flattening nested concatenations
    pub fn concat(self, other: impl Into<Expr>) -> Self {
        let mut parts = match self {
            Expr::Concat(parts) => parts,
            single => vec![single],
        };
        match other.into() {
            Expr::Concat(more) => parts.extend(more),
            single => parts.push(single),
        }
        Expr::Concat(parts)
    }

    pub fn result_type(&self) -> QueryResult<CellType> {
        match self {
            Expr::Field(field) if field.is_text() => Ok(CellType::Text),
            Expr::Field(_) => Ok(CellType::Long),
            Expr::Constant(Value::Text(_)) => Ok(CellType::Text),
            Expr::Constant(_) => Ok(CellType::Long),
            Expr::Concat(parts) => {
                for part in parts {
                    part.result_type()?;
                }
                Ok(CellType::Text)
            }
            Expr::Case {
                branches,
                otherwise,
            } => {
                if branches.is_empty() {
                    return Err(QueryError::InvalidComposition(
                        "CASE needs at least one WHEN branch".to_string(),
                    ));
                }
                let expected = otherwise.result_type()?;
                for (_, result) in branches {
                    let found = result.result_type()?;
                    if found != expected {
                        return Err(QueryError::InvalidComposition(format!(
                            "CASE mixes {} and {} results",
                            found, expected
                        )));
                    }
                }
                Ok(expected)
            }
            Expr::Subquery(subquery) => match subquery.aggregate {
                Some(AgeAggregate::Avg) => Ok(CellType::Double),
                Some(_) => Ok(CellType::Long),
                None => Err(QueryError::InvalidComposition(
                    "a list subquery cannot be selected as a column".to_string(),
                )),
            },
        }
    }

    /// True if any column outside a subquery belongs to the joined team
    pub fn references_team(&self) -> bool {
        match self {
            Expr::Field(field) => field.is_team_field(),
            Expr::Constant(_) | Expr::Subquery(_) => false,
            Expr::Concat(parts) => parts.iter().any(Expr::references_team),
            Expr::Case {
                branches,
                otherwise,
            } => {
                otherwise.references_team()
                    || branches
                        .iter()
                        .any(|(condition, result)| condition.references_team() || result.references_team())
            }
        }
    }

    fn validate(&self) -> QueryResult<()> {
        match self {
            Expr::Field(_) | Expr::Constant(_) => Ok(()),
            Expr::Concat(parts) => parts.iter().try_for_each(Expr::validate),
            Expr::Case {
                branches,
                otherwise,
            } => {
                for (condition, result) in branches {
                    condition.validate()?;
                    result.validate()?;
                }
                otherwise.validate()
            }
            Expr::Subquery(subquery) => subquery.validate_scalar(),
        }
    }
}

impl From<Field> for Expr {
    fn from(field: Field) -> Self {
        Expr::Field(field)
    }
}

impl From<StringPath> for Expr {
    fn from(path: StringPath) -> Self {
        Expr::Field(path.field())
    }
}

impl<T> From<NumberPath<T>> for Expr {
    fn from(path: NumberPath<T>) -> Self {
        Expr::Field(Field::from(path))
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::constant(text)
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Expr::constant(text)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::constant(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::constant(value)
    }
}

impl From<AgeSubquery> for Expr {
    fn from(subquery: AgeSubquery) -> Self {
        Expr::subquery(subquery)
    }
}

/// Searched `CASE` with at least one completed branch
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBuilder {
    branches: Vec<(Predicate, Expr)>,
}

impl CaseBuilder {
    pub fn when(self, condition: Predicate) -> CaseWhen {
        CaseWhen {
            branches: self.branches,
            condition,
        }
    }

    pub fn otherwise(self, result: impl Into<Expr>) -> Expr {
        Expr::Case {
            branches: self.branches,
            otherwise: Box::new(result.into()),
        }
    }
}

/// `WHEN` waiting for its `THEN`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseWhen {
    branches: Vec<(Predicate, Expr)>,
    condition: Predicate,
}

impl CaseWhen {
    pub fn then(mut self, result: impl Into<Expr>) -> CaseBuilder {
        self.branches.push((self.condition, result.into()));
        CaseBuilder {
            branches: self.branches,
        }
    }
}

/// `CASE field WHEN value THEN ...`; each value becomes `field = value`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCase<T> {
    field: Field,
    branches: Vec<(Predicate, Expr)>,
    _marker: PhantomData<T>,
}

impl<T: Into<Value>> ValueCase<T> {
    pub(crate) fn new(field: Field) -> Self {
        Self {
            field,
            branches: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn when(self, value: T) -> ValueCaseWhen<T> {
        let condition = Predicate::Compare {
            field: self.field,
            op: CmpOp::Eq,
            rhs: Operand::Value(value.into()),
        };
        ValueCaseWhen {
            case: self,
            condition,
        }
    }

    pub fn otherwise(self, result: impl Into<Expr>) -> Expr {
        Expr::Case {
            branches: self.branches,
            otherwise: Box::new(result.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueCaseWhen<T> {
    case: ValueCase<T>,
    condition: Predicate,
}

impl<T> ValueCaseWhen<T> {
    pub fn then(mut self, result: impl Into<Expr>) -> ValueCase<T> {
        self.case.branches.push((self.condition, result.into()));
        self.case
    }
}

/// Validates a projection against its query and returns each column's type
pub fn column_types(query: &MemberQuery, columns: &[Expr]) -> QueryResult<Vec<CellType>> {
    query.validate()?;
    if columns.is_empty() {
        return Err(QueryError::InvalidComposition(
            "a projection needs at least one column".to_string(),
        ));
    }
    if query.join_kind().is_none() {
        if let Some(column) = columns.iter().find(|column| column.references_team()) {
            return Err(QueryError::InvalidComposition(format!(
                "column {:?} references the team without a team join",
                column
            )));
        }
    }

    columns
        .iter()
        .map(|column| {
            column.validate()?;
            column.result_type()
        })
        .collect()
}
