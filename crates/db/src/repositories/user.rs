use sqlx::{sqlite::SqliteRow, Row};

use basket_core::domain::user::{User, UserId};

use super::{parse_timestamp, RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(user_from_row).transpose()
    }
}

fn user_from_row(row: SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::SqlUserRepository;
    use crate::migrations::run_pending;
    use crate::repositories::UserRepository;
    use crate::connect_in_memory;
    use basket_core::domain::user::UserId;

    async fn seeded_pool() -> crate::DbPool {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        sqlx::query(
            "INSERT INTO users (id, email, name, created_at)
             VALUES (1, 'amy@example.com', 'Amy', '2026-01-05T09:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("seed user");
        pool
    }

    #[tokio::test]
    async fn finds_user_by_id_and_email() {
        let pool = seeded_pool().await;
        let repo = SqlUserRepository::new(pool);

        let by_id = repo.find_by_id(UserId(1)).await.expect("find by id").expect("present");
        assert_eq!(by_id.email, "amy@example.com");

        let by_email = repo
            .find_by_email("amy@example.com")
            .await
            .expect("find by email")
            .expect("present");
        assert_eq!(by_email.id, UserId(1));
        assert_eq!(by_email.name, "Amy");
    }

    #[tokio::test]
    async fn missing_user_resolves_to_none() {
        let pool = seeded_pool().await;
        let repo = SqlUserRepository::new(pool);

        assert!(repo.find_by_id(UserId(999)).await.expect("find").is_none());
        assert!(repo.find_by_email("nobody@example.com").await.expect("find").is_none());
    }
}
