use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use basket_core::domain::cart::{validate_quantity, CartItem, CartItemId, NewCartItem};
use basket_core::domain::product::{Product, ProductId, ProductStatus};
use basket_core::domain::user::UserId;
use basket_db::repositories::{CartItemRepository, ProductRepository, UserRepository};

use crate::error::ServiceError;

/// Cart workflow over the storage contracts. All operations resolve the
/// acting user first, so an unknown user is always `NotFound` before
/// any cart state is touched.
///
/// Concurrency: operations read then write without a compare-and-swap.
/// SQLite serializes writers and the in-memory repositories serialize
/// through their locks, so concurrent adds for the same (user, product)
/// pair resolve in some order rather than corrupting state. A rapid
/// double-add can still sum both quantities; the stock ceiling is
/// re-checked on every write, so the cart never exceeds stock.
pub struct CartService {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    cart_items: Arc<dyn CartItemRepository>,
}

/// A cart line flattened with the product data a caller renders:
/// current price, stock, and listing state alongside the quantity.
#[derive(Clone, Debug, Serialize)]
pub struct CartItemView {
    pub cart_item_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_status: ProductStatus,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
    pub stock: u32,
    pub image_url: Option<String>,
}

impl CartItemView {
    fn from_parts(item: &CartItem, product: &Product) -> Self {
        Self {
            cart_item_id: item.id.0,
            product_id: product.id.0,
            product_name: product.name.clone(),
            product_status: product.status,
            unit_price: product.price,
            quantity: item.quantity,
            line_total: product.price * Decimal::from(item.quantity),
            stock: product.stock,
            image_url: product.image_url.clone(),
        }
    }
}

impl CartService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        cart_items: Arc<dyn CartItemRepository>,
    ) -> Self {
        Self { users, products, cart_items }
    }

    /// Add a product to the user's cart. A repeat add for the same
    /// product folds into the existing line by summing quantities; the
    /// combined quantity must still fit within current stock.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItemView, ServiceError> {
        validate_quantity(quantity)?;
        self.resolve_user(user_id).await?;
        let product = self.resolve_product(product_id).await?;

        if !product.is_active() {
            return Err(ServiceError::ProductNotActive { product_id: product_id.0 });
        }

        let existing = self.cart_items.find_for_user_product(user_id, product_id).await?;
        let item = match existing {
            Some(existing) => {
                let combined = existing.quantity.saturating_add(quantity);
                ensure_stock(combined, product.stock)?;
                self.cart_items.update_quantity(existing.id, combined).await?
            }
            None => {
                ensure_stock(quantity, product.stock)?;
                let new_item = NewCartItem::new(user_id, product_id, quantity)?;
                self.cart_items.insert(&new_item).await?
            }
        };

        info!(
            event_name = "cart.item_added",
            user_id = user_id.0,
            product_id = product_id.0,
            quantity = item.quantity,
            "cart line saved"
        );

        Ok(CartItemView::from_parts(&item, &product))
    }

    /// List the user's cart in insertion order.
    pub async fn my_cart(&self, user_id: UserId) -> Result<Vec<CartItemView>, ServiceError> {
        self.resolve_user(user_id).await?;

        let lines = self.cart_items.list_for_user(user_id).await?;
        Ok(lines
            .iter()
            .map(|line| CartItemView::from_parts(&line.item, &line.product))
            .collect())
    }

    /// Replace the quantity of one of the user's cart lines. Existence
    /// is checked before ownership, so a cart item that belongs to
    /// another user is `Forbidden`, never `NotFound`.
    pub async fn update_cart_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItemView, ServiceError> {
        validate_quantity(quantity)?;
        self.resolve_user(user_id).await?;

        let item = self.resolve_item(item_id).await?;
        ensure_owner(user_id, &item)?;

        let product = self.resolve_product(item.product_id).await?;
        ensure_stock(quantity, product.stock)?;

        let updated = self.cart_items.update_quantity(item.id, quantity).await?;

        info!(
            event_name = "cart.item_updated",
            user_id = user_id.0,
            cart_item_id = item_id.0,
            quantity,
            "cart line quantity replaced"
        );

        Ok(CartItemView::from_parts(&updated, &product))
    }

    /// Remove one of the user's cart lines.
    pub async fn remove_cart_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), ServiceError> {
        self.resolve_user(user_id).await?;

        let item = self.resolve_item(item_id).await?;
        ensure_owner(user_id, &item)?;

        self.cart_items.delete(item.id).await?;

        info!(
            event_name = "cart.item_removed",
            user_id = user_id.0,
            cart_item_id = item_id.0,
            "cart line removed"
        );

        Ok(())
    }

    /// Empty the user's cart, returning how many lines were removed.
    /// Clearing an already-empty cart succeeds with zero.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<u64, ServiceError> {
        self.resolve_user(user_id).await?;

        let removed = self.cart_items.delete_all_for_user(user_id).await?;

        info!(event_name = "cart.cleared", user_id = user_id.0, removed, "cart emptied");

        Ok(removed)
    }

    /// Number of distinct cart lines, not summed quantities.
    pub async fn cart_count(&self, user_id: UserId) -> Result<u64, ServiceError> {
        self.resolve_user(user_id).await?;
        Ok(self.cart_items.count_for_user(user_id).await?)
    }

    async fn resolve_user(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(ServiceError::NotFound { resource: "user" })
    }

    async fn resolve_product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(ServiceError::NotFound { resource: "product" })
    }

    async fn resolve_item(&self, item_id: CartItemId) -> Result<CartItem, ServiceError> {
        self.cart_items
            .find_by_id(item_id)
            .await?
            .ok_or(ServiceError::NotFound { resource: "cart item" })
    }
}

fn ensure_owner(user_id: UserId, item: &CartItem) -> Result<(), ServiceError> {
    if item.user_id != user_id {
        return Err(ServiceError::Forbidden { resource: "cart item", id: item.id.0 });
    }
    Ok(())
}

fn ensure_stock(requested: u32, available: u32) -> Result<(), ServiceError> {
    if requested > available {
        return Err(ServiceError::InsufficientStock { requested, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use basket_core::domain::cart::CartItemId;
    use basket_core::domain::product::{Product, ProductId, ProductStatus};
    use basket_core::domain::user::UserId;
    use basket_db::repositories::{
        InMemoryCartItemRepository, InMemoryProductRepository, InMemoryUserRepository,
        ProductRepository,
    };

    use crate::error::{ErrorKind, ServiceError};

    use super::CartService;

    struct Harness {
        service: CartService,
        amy: UserId,
        ben: UserId,
    }

    const KEYBOARD: ProductId = ProductId(501);
    const MOUSE: ProductId = ProductId(503);
    const MONITOR_ARM: ProductId = ProductId(504);
    const DESK_MAT: ProductId = ProductId(505);

    fn product(id: ProductId, stock: u32, status: ProductStatus) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: format!("Product {}", id.0),
            description: None,
            price: Decimal::new(1050, 2),
            stock,
            image_url: Some(format!("https://img.example.com/p/{}.jpg", id.0)),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    async fn harness() -> Harness {
        let users = Arc::new(InMemoryUserRepository::default());
        let products = Arc::new(InMemoryProductRepository::default());
        let cart_items = Arc::new(InMemoryCartItemRepository::new(products.clone()));

        let amy = users.insert("amy@example.com", "Amy").await.id;
        let ben = users.insert("ben@example.com", "Ben").await.id;

        products.save(&product(KEYBOARD, 10, ProductStatus::Active)).await.expect("seed");
        products.save(&product(MOUSE, 3, ProductStatus::Active)).await.expect("seed");
        products.save(&product(MONITOR_ARM, 40, ProductStatus::Inactive)).await.expect("seed");
        products.save(&product(DESK_MAT, 0, ProductStatus::SoldOut)).await.expect("seed");

        let service = CartService::new(users, products, cart_items);
        Harness { service, amy, ben }
    }

    #[tokio::test]
    async fn fresh_add_appears_in_cart_listing() {
        let h = harness().await;

        let view = h.service.add_to_cart(h.amy, KEYBOARD, 2).await.expect("add");
        assert_eq!(view.quantity, 2);
        assert_eq!(view.line_total, Decimal::new(2100, 2));

        let cart = h.service.my_cart(h.amy).await.expect("list");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_id, KEYBOARD.0);
        assert_eq!(cart[0].product_name, "Product 501");
        assert_eq!(cart[0].stock, 10);
    }

    #[tokio::test]
    async fn repeat_add_sums_quantities_within_stock() {
        let h = harness().await;

        h.service.add_to_cart(h.amy, KEYBOARD, 3).await.expect("first add");
        let view = h.service.add_to_cart(h.amy, KEYBOARD, 4).await.expect("second add");
        assert_eq!(view.quantity, 7);

        let cart = h.service.my_cart(h.amy).await.expect("list");
        assert_eq!(cart.len(), 1, "repeat add must fold into the existing line");
    }

    #[tokio::test]
    async fn repeat_add_exceeding_stock_is_rejected() {
        let h = harness().await;

        h.service.add_to_cart(h.amy, KEYBOARD, 3).await.expect("first add");
        let error = h.service.add_to_cart(h.amy, KEYBOARD, 8).await.expect_err("over stock");
        assert!(matches!(
            error,
            ServiceError::InsufficientStock { requested: 11, available: 10 }
        ));

        // The original line is left untouched.
        let cart = h.service.my_cart(h.amy).await.expect("list");
        assert_eq!(cart[0].quantity, 3);
    }

    #[tokio::test]
    async fn single_add_exceeding_stock_is_rejected() {
        let h = harness().await;

        let error = h.service.add_to_cart(h.amy, MOUSE, 4).await.expect_err("over stock");
        assert_eq!(error.kind(), ErrorKind::Unprocessable);
    }

    #[tokio::test]
    async fn non_active_products_are_rejected_regardless_of_stock() {
        let h = harness().await;

        // Inactive with plenty of stock.
        let error = h.service.add_to_cart(h.amy, MONITOR_ARM, 1).await.expect_err("inactive");
        assert!(matches!(error, ServiceError::ProductNotActive { product_id: 504 }));

        // Sold out.
        let error = h.service.add_to_cart(h.amy, DESK_MAT, 1).await.expect_err("sold out");
        assert_eq!(error.kind(), ErrorKind::Unprocessable);
    }

    #[tokio::test]
    async fn zero_quantity_is_unprocessable() {
        let h = harness().await;

        let error = h.service.add_to_cart(h.amy, KEYBOARD, 0).await.expect_err("zero add");
        assert_eq!(error.kind(), ErrorKind::Unprocessable);

        let item = h.service.add_to_cart(h.amy, KEYBOARD, 1).await.expect("add");
        let error = h
            .service
            .update_cart_item(h.amy, CartItemId(item.cart_item_id), 0)
            .await
            .expect_err("zero update");
        assert_eq!(error.kind(), ErrorKind::Unprocessable);
    }

    #[tokio::test]
    async fn unknown_user_and_product_are_not_found() {
        let h = harness().await;

        let error =
            h.service.add_to_cart(UserId(999), KEYBOARD, 1).await.expect_err("unknown user");
        assert!(matches!(error, ServiceError::NotFound { resource: "user" }));

        let error =
            h.service.add_to_cart(h.amy, ProductId(999), 1).await.expect_err("unknown product");
        assert!(matches!(error, ServiceError::NotFound { resource: "product" }));

        let error = h.service.my_cart(UserId(999)).await.expect_err("unknown user");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_replaces_quantity_within_stock() {
        let h = harness().await;

        let item = h.service.add_to_cart(h.amy, KEYBOARD, 2).await.expect("add");
        let view = h
            .service
            .update_cart_item(h.amy, CartItemId(item.cart_item_id), 9)
            .await
            .expect("update");
        assert_eq!(view.quantity, 9);

        let error = h
            .service
            .update_cart_item(h.amy, CartItemId(item.cart_item_id), 11)
            .await
            .expect_err("over stock");
        assert!(matches!(
            error,
            ServiceError::InsufficientStock { requested: 11, available: 10 }
        ));
    }

    #[tokio::test]
    async fn foreign_cart_items_are_forbidden_never_not_found() {
        let h = harness().await;

        let item = h.service.add_to_cart(h.amy, KEYBOARD, 2).await.expect("add");
        let item_id = CartItemId(item.cart_item_id);

        let error = h.service.update_cart_item(h.ben, item_id, 1).await.expect_err("foreign");
        assert!(matches!(error, ServiceError::Forbidden { resource: "cart item", .. }));

        let error = h.service.remove_cart_item(h.ben, item_id).await.expect_err("foreign");
        assert_eq!(error.kind(), ErrorKind::Forbidden);

        // A genuinely absent item is NotFound for everyone.
        let error = h
            .service
            .remove_cart_item(h.amy, CartItemId(999))
            .await
            .expect_err("missing item");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn remove_then_clear_then_count() {
        let h = harness().await;

        let first = h.service.add_to_cart(h.amy, KEYBOARD, 1).await.expect("add");
        h.service.add_to_cart(h.amy, MOUSE, 1).await.expect("add");
        assert_eq!(h.service.cart_count(h.amy).await.expect("count"), 2);

        h.service
            .remove_cart_item(h.amy, CartItemId(first.cart_item_id))
            .await
            .expect("remove");
        assert_eq!(h.service.cart_count(h.amy).await.expect("count"), 1);

        let removed = h.service.clear_cart(h.amy).await.expect("clear");
        assert_eq!(removed, 1);
        assert_eq!(h.service.cart_count(h.amy).await.expect("count"), 0);

        // Clearing again is a harmless no-op.
        let removed = h.service.clear_cart(h.amy).await.expect("clear empty");
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn count_matches_listing_length() {
        let h = harness().await;

        h.service.add_to_cart(h.amy, KEYBOARD, 5).await.expect("add");
        h.service.add_to_cart(h.amy, MOUSE, 2).await.expect("add");
        h.service.add_to_cart(h.ben, KEYBOARD, 1).await.expect("add");

        let listed = h.service.my_cart(h.amy).await.expect("list");
        let counted = h.service.cart_count(h.amy).await.expect("count");
        assert_eq!(listed.len() as u64, counted);
        assert_eq!(counted, 2, "count is distinct lines, not summed quantities");
    }
}
