use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use basket_core::domain::cart::{CartItem, CartItemId, CartItemWithProduct, NewCartItem};
use basket_core::domain::notification::{NewNotification, Notification, NotificationId};
use basket_core::domain::product::{Product, ProductId};
use basket_core::domain::user::{User, UserId};

pub mod cart_item;
pub mod memory;
pub mod notification;
pub mod product;
pub mod user;

pub use cart_item::SqlCartItemRepository;
pub use memory::{
    InMemoryCartItemRepository, InMemoryNotificationRepository, InMemoryProductRepository,
    InMemoryUserRepository,
};
pub use notification::SqlNotificationRepository;
pub use product::SqlProductRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;
}

/// Storage contract for cart lines. Listing returns lines joined with
/// their product rows, ordered by insertion (ascending id).
#[async_trait]
pub trait CartItemRepository: Send + Sync {
    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError>;

    async fn find_for_user_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, RepositoryError>;

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartItemWithProduct>, RepositoryError>;

    async fn insert(&self, item: &NewCartItem) -> Result<CartItem, RepositoryError>;

    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError>;

    async fn delete(&self, id: CartItemId) -> Result<(), RepositoryError>;

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}

/// Storage contract for user notifications. Listing is newest-first
/// (created_at descending, id descending as tie-break).
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: NotificationId)
        -> Result<Option<Notification>, RepositoryError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError>;

    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError>;

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    async fn insert(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError>;
}

pub(crate) fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        },
    )
}

pub(crate) fn parse_u32(column: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| {
        RepositoryError::Decode(format!("value out of range for `{column}`: `{value}`"))
    })
}
