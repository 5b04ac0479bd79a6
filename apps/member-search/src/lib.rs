//! Member Search Library
//!
//! Composable, optional-condition queries over members and their teams:
//! predicate fragments, a fluent query composer, three pagination count
//! strategies and DTO projection, backed by PostgreSQL or an in-memory store.

pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod query;
