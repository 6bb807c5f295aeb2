use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// Connects to the catalog database and makes sure `job_profiles` exists.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL catalog...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    ensure_schema(&pool).await?;
    info!("PostgreSQL catalog pool ready");
    Ok(pool)
}

/// `fields` stays JSON rather than JSONB: JSONB reorders object keys.
async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_profiles (
            id          UUID PRIMARY KEY,
            position    INTEGER NOT NULL,
            fields      JSON NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create job_profiles table")?;
    Ok(())
}
