use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use basket_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open a pool from the database section of the app config. Every
/// connection gets the same session setup: foreign keys on (cart lines
/// and notifications cascade from their user), WAL so readers do not
/// block the writer, and a busy timeout so a second writer queues
/// instead of failing immediately.
pub async fn connect(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(database.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(database.timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&database.url)
        .await
}

/// Single-connection in-memory pool. The lone connection is what keeps
/// the database alive, so this is only suitable for tests and local
/// scratch work.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        timeout_secs: 30,
    })
    .await
}

#[cfg(test)]
mod tests {
    use basket_core::config::DatabaseConfig;

    use super::{connect, connect_in_memory};

    #[tokio::test]
    async fn sessions_enforce_foreign_keys() {
        let pool = connect_in_memory().await.expect("connect");

        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("read pragma");
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn zero_pool_settings_are_clamped_to_usable_values() {
        // A config that validated would never carry zeros, but the pool
        // still refuses to be built with them.
        let pool = connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 0,
            timeout_secs: 0,
        })
        .await
        .expect("connect");

        sqlx::query("SELECT 1").execute(&pool).await.expect("usable pool");
    }
}
