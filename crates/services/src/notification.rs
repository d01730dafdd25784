use std::sync::Arc;

use tracing::info;

use basket_core::domain::notification::{Notification, NotificationId};
use basket_core::domain::user::UserId;
use basket_db::repositories::{NotificationRepository, UserRepository};

use crate::error::ServiceError;

/// Notification feed for a user: newest-first listing, unread count,
/// and read transitions. Ownership follows the cart rule: a foreign
/// notification is `Forbidden`, a missing one is `NotFound`.
pub struct NotificationService {
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self { users, notifications }
    }

    pub async fn notifications_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, ServiceError> {
        self.resolve_user(user_id).await?;
        Ok(self.notifications.list_for_user(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: UserId) -> Result<u64, ServiceError> {
        self.resolve_user(user_id).await?;
        Ok(self.notifications.count_unread(user_id).await?)
    }

    /// Mark one notification read. Re-marking an already-read
    /// notification succeeds without effect.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<(), ServiceError> {
        self.resolve_user(user_id).await?;

        let notification = self
            .notifications
            .find_by_id(notification_id)
            .await?
            .ok_or(ServiceError::NotFound { resource: "notification" })?;

        if notification.user_id != user_id {
            return Err(ServiceError::Forbidden {
                resource: "notification",
                id: notification_id.0,
            });
        }

        self.notifications.mark_read(notification_id).await?;

        info!(
            event_name = "notification.read",
            user_id = user_id.0,
            notification_id = notification_id.0,
            "notification marked read"
        );

        Ok(())
    }

    /// Mark the user's whole feed read, returning how many rows flipped.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, ServiceError> {
        self.resolve_user(user_id).await?;

        let marked = self.notifications.mark_all_read(user_id).await?;

        info!(
            event_name = "notification.all_read",
            user_id = user_id.0,
            marked,
            "notification feed marked read"
        );

        Ok(marked)
    }

    async fn resolve_user(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(ServiceError::NotFound { resource: "user" })
    }
}
