use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating the portraits table if it does not exist.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let portraits_table = config.portraits_table();

    // Addresses are stored lower-cased; the primary key is the only
    // uniqueness guard the upsert relies on.
    let create_portraits = format!(
        "CREATE TABLE IF NOT EXISTS {portraits_table} (
            address VARCHAR(42) PRIMARY KEY,
            image_url TEXT NOT NULL,
            prompt TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"
    );

    sqlx::query(&create_portraits).execute(pool).await?;

    Ok(())
}
