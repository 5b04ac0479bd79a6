use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate identifier of a persisted team
///
/// # Example
/// ```
/// use member_search::domain::team::value_objects::TeamId;
///
/// let id = TeamId::new(3);
/// assert_eq!(id.value(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
