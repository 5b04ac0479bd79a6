use thiserror::Error;

/// Errors surfaced by query composition, execution and the repositories
///
/// Nothing in this crate recovers from these locally; they are handed back
/// to the caller unchanged.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid query composition: {0}")]
    InvalidComposition(String),

    #[error("Unknown sort property: {0}")]
    UnknownSortProperty(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Expected at most one row but query returned {0}")]
    NonUniqueResult(usize),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type QueryResult<T> = Result<T, QueryError>;
