use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

use basket_core::domain::notification::{
    NewNotification, Notification, NotificationId, NotificationType,
};
use basket_core::domain::user::UserId;

use super::{parse_timestamp, NotificationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlNotificationRepository {
    pool: DbPool,
}

impl SqlNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for SqlNotificationRepository {
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, kind, title, content, is_read, created_at
             FROM notifications
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(notification_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, title, content, is_read, created_at
             FROM notifications
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(notification_from_row).collect()
    }

    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id.0)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn insert(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, content, is_read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(notification.user_id.0)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id: NotificationId(result.last_insert_rowid()),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title.clone(),
            content: notification.content.clone(),
            read: false,
            created_at: now,
        })
    }
}

fn notification_from_row(row: SqliteRow) -> Result<Notification, RepositoryError> {
    let kind_raw = row.try_get::<String, _>("kind")?;
    let kind = NotificationType::parse(&kind_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown notification kind `{kind_raw}`"))
    })?;

    Ok(Notification {
        id: NotificationId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        kind,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        read: row.try_get::<i64, _>("is_read")? != 0,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}
