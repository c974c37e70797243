use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::AppResult;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_conn)
        .min_connections(config.max_idle_conn.min(config.max_open_conn))
        .max_lifetime(config.max_lifetime()?)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(config.connect_options()?)
        .await?;

    // Test connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}
