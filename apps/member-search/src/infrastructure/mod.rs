// Infrastructure layer module
// Contains the PostgreSQL and in-memory adapters behind the domain traits

pub mod database;
pub mod repositories;
