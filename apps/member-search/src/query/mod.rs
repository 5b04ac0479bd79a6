//! # Member query composition
//!
//! Optional search fields become predicate fragments, fragments become a
//! [`MemberQuery`], and a [`QueryEngine`] runs it.
//!
//! - [`path`] - typed column paths (`member::age()`, `team::name()`)
//! - [`predicate`] - predicate tree, comparison operators, age subqueries
//! - [`fragments`] - optional fragments for `MemberSearchCondition` fields
//! - [`composer`] - join, filters, ordering, offset and limit
//! - [`engine`] - the execution port and its row types
//! - [`pagination`] - the three total-count strategies
//! - [`projection`] - computed select columns: constants, concat, CASE, subqueries
//! - [`materializer`] - rows to DTOs and pages

pub mod composer;
pub mod engine;
pub mod fragments;
pub mod materializer;
pub mod pagination;
pub mod path;
pub mod predicate;
pub mod projection;

pub use composer::{JoinKind, MemberQuery};
pub use engine::{
    AgeStats, Assignment, JoinedTeam, MemberTeamRow, PagedRows, QueryEngine, TeamAgeAverage,
};
pub use pagination::{fetch_page, CountStrategy};
pub use path::{Field, OrderSpecifier, Value};
pub use predicate::{AgeAggregate, AgeSubquery, CmpOp, Operand, Predicate};
pub use projection::{Cell, CellType, Expr};
