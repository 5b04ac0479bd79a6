use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::errors::QueryResult;

/// Embedded migrations creating the `teams` and `members` tables
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens a pool and brings the schema up to date
pub async fn connect(config: &DatabaseConfig) -> QueryResult<PgPool> {
    tracing::info!(max_connections = config.max_connections, "Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database connected and migrated");

    Ok(pool)
}
