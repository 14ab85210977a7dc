use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connects to Postgres when a URL is configured. Returns `None` when the
/// database is absent or unreachable so the service can run store-less.
pub async fn try_create_pool(database_url: Option<&str>) -> Option<PgPool> {
    let url = database_url?;

    match PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            tracing::warn!(error = %err, "database unreachable, continuing without a store");
            None
        }
    }
}
