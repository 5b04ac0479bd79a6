// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces and the query engine

mod in_memory_eval;
mod postgres_sql;

pub mod in_memory_database;
pub mod in_memory_member_repository;
pub mod in_memory_query_engine;
pub mod in_memory_team_repository;
pub mod member_query_repository;
pub mod postgres_member_repository;
pub mod postgres_query_engine;
pub mod postgres_team_repository;

pub use in_memory_database::InMemoryDatabase;
pub use in_memory_member_repository::InMemoryMemberRepository;
pub use in_memory_query_engine::InMemoryQueryEngine;
pub use in_memory_team_repository::InMemoryTeamRepository;
pub use member_query_repository::MemberQueryRepository;
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_query_engine::PostgresQueryEngine;
pub use postgres_team_repository::PostgresTeamRepository;
