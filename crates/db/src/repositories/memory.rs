use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use basket_core::domain::cart::{CartItem, CartItemId, CartItemWithProduct, NewCartItem};
use basket_core::domain::notification::{
    NewNotification, Notification, NotificationId,
};
use basket_core::domain::product::{Product, ProductId};
use basket_core::domain::user::{User, UserId};

use super::{
    CartItemRepository, NotificationRepository, ProductRepository, RepositoryError, UserRepository,
};

/// In-memory repositories for tests and local wiring. Ids are assigned
/// from a per-repository counter so listing order matches insertion
/// order, the same contract the SQL repositories provide.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub async fn insert(&self, email: &str, name: &str) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id: UserId(id),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.users.write().await.insert(id, user.clone());
        user
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(&id.0).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<i64, Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id.0, product.clone());
        Ok(())
    }
}

/// Holds a handle to the product repository so list results can carry
/// the joined product row, matching the SQL join.
pub struct InMemoryCartItemRepository {
    products: Arc<InMemoryProductRepository>,
    items: RwLock<HashMap<i64, CartItem>>,
    next_id: AtomicI64,
}

impl InMemoryCartItemRepository {
    pub fn new(products: Arc<InMemoryProductRepository>) -> Self {
        Self { products, items: RwLock::new(HashMap::new()), next_id: AtomicI64::new(0) }
    }
}

#[async_trait::async_trait]
impl CartItemRepository for InMemoryCartItemRepository {
    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.get(&id.0).cloned())
    }

    async fn find_for_user_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .find(|item| item.user_id == user_id && item.product_id == product_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartItemWithProduct>, RepositoryError> {
        let mut lines = {
            let items = self.items.read().await;
            items.values().filter(|item| item.user_id == user_id).cloned().collect::<Vec<_>>()
        };
        lines.sort_by_key(|item| item.id.0);

        let mut joined = Vec::with_capacity(lines.len());
        for item in lines {
            let product = self.products.find_by_id(item.product_id).await?.ok_or_else(|| {
                RepositoryError::Decode(format!(
                    "cart line {} references missing product {}",
                    item.id.0, item.product_id.0
                ))
            })?;
            joined.push(CartItemWithProduct { item, product });
        }
        Ok(joined)
    }

    async fn insert(&self, item: &NewCartItem) -> Result<CartItem, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let stored = CartItem {
            id: CartItemId(id),
            user_id: item.user_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: now,
            updated_at: now,
        };
        self.items.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&id.0)
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        items
            .remove(&id.0)
            .map(|_| ())
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, item| item.user_id != user_id);
        Ok((before - items.len()) as u64)
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.values().filter(|item| item.user_id == user_id).count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<i64, Notification>>,
    next_id: AtomicI64,
}

#[async_trait::async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id.0).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let mut listed = {
            let notifications = self.notifications.read().await;
            notifications
                .values()
                .filter(|notification| notification.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>()
        };
        listed.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(listed)
    }

    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|notification| notification.user_id == user_id && !notification.read)
            .count() as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let mut notifications = self.notifications.write().await;
        if let Some(notification) = notifications.get_mut(&id.0) {
            notification.read = true;
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut notifications = self.notifications.write().await;
        let mut marked = 0;
        for notification in notifications.values_mut() {
            if notification.user_id == user_id && !notification.read {
                notification.read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn insert(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Notification {
            id: NotificationId(id),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title.clone(),
            content: notification.content.clone(),
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.write().await.insert(id, stored.clone());
        Ok(stored)
    }
}
