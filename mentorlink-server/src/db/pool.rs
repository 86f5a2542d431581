//! PostgreSQL pool setup

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

/// How long a request waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect a pool holding at most `max_connections` (at least one).
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let max_connections = max_connections.max(1);
    debug!(max_connections, "connecting to database");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    // DATABASE_URL=postgres://... cargo test -p mentorlink-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn zero_max_connections_still_connects() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url, 0).await.expect("pool creation failed");

        let one: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(one.0, 1);
        assert_eq!(pool.options().get_max_connections(), 1);
    }
}
