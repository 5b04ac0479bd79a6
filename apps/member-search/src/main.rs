use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use member_search::config::AppConfig;
use member_search::domain::member::NewMember;
use member_search::domain::repositories::{
    MemberRepository, MemberSearchRepository, TeamRepository,
};
use member_search::domain::search::{MemberSearchCondition, PageRequest};
use member_search::domain::team::NewTeam;
use member_search::infrastructure::database;
use member_search::infrastructure::repositories::{
    InMemoryDatabase, InMemoryMemberRepository, InMemoryQueryEngine, InMemoryTeamRepository,
    MemberQueryRepository, PostgresMemberRepository, PostgresQueryEngine, PostgresTeamRepository,
};
use member_search::query::engine::QueryEngine;
use member_search::query::path::member;
use member_search::query::projection::Expr;
use member_search::query::MemberQuery;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pageable = config.first_page()?;

    match &config.database {
        Some(db_config) => {
            let pool = database::connect(db_config).await?;
            run(
                &PostgresTeamRepository::new(pool.clone()),
                &PostgresMemberRepository::new(pool.clone()),
                &MemberQueryRepository::new(Arc::new(PostgresQueryEngine::new(pool))),
                &pageable,
            )
            .await?;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            let db = InMemoryDatabase::new();
            run(
                &InMemoryTeamRepository::new(db.clone()),
                &InMemoryMemberRepository::new(db.clone()),
                &MemberQueryRepository::new(Arc::new(InMemoryQueryEngine::new(db))),
                &pageable,
            )
            .await?;
        }
    }

    Ok(())
}

async fn run<E: QueryEngine>(
    teams: &dyn TeamRepository,
    members: &dyn MemberRepository,
    search: &MemberQueryRepository<E>,
    pageable: &PageRequest,
) -> Result<(), Box<dyn Error>> {
    let team_a = teams.save(NewTeam::new("teamA")).await?;
    let team_b = teams.save(NewTeam::new("teamB")).await?;
    for (username, age, team) in [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ] {
        members
            .save(NewMember::new(username, age).in_team(team.id()))
            .await?;
    }
    members.save(NewMember::new("member5", 50)).await?;
    tracing::info!("Seeded 2 teams and 5 members");

    let condition = MemberSearchCondition::default()
        .with_team_name("teamB")
        .with_age_goe(35);
    let found = search.search(&condition).await?;
    tracing::info!(
        condition = %serde_json::to_string(&condition)?,
        result = %serde_json::to_string(&found)?,
        "search"
    );

    let everyone = MemberSearchCondition::default();
    let simple = search.search_page_simple(&everyone, pageable).await?;
    tracing::info!(page = %serde_json::to_string(&simple)?, "simple page");

    let complex = search.search_page_complex(&everyone, pageable).await?;
    tracing::info!(page = %serde_json::to_string(&complex)?, "complex page");

    let optimized = search
        .search_page_optimized(&everyone, &pageable.next())
        .await?;
    tracing::info!(page = %serde_json::to_string(&optimized)?, "optimized page");

    let labels = [
        Expr::from(member::username()).concat("_").concat(member::age()),
        Expr::case_when(member::age().between(0, 30))
            .then("0~30")
            .otherwise("31~"),
    ];
    let labelled = search
        .engine()
        .project(&MemberQuery::select_from_members(), &labels)
        .await?;
    tracing::info!(rows = %serde_json::to_string(&labelled)?, "labelled members");

    Ok(())
}
