use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use basket_core::domain::cart::{CartItem, CartItemId, CartItemWithProduct, NewCartItem};
use basket_core::domain::product::{Product, ProductId, ProductStatus};
use basket_core::domain::user::UserId;

use super::{parse_timestamp, parse_u32, CartItemRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCartItemRepository {
    pool: DbPool,
}

impl SqlCartItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CartItemRepository for SqlCartItemRepository {
    async fn find_by_id(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, product_id, quantity, created_at, updated_at
             FROM cart_items
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(cart_item_from_row).transpose()
    }

    async fn find_for_user_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, product_id, quantity, created_at, updated_at
             FROM cart_items
             WHERE user_id = ? AND product_id = ?",
        )
        .bind(user_id.0)
        .bind(product_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(cart_item_from_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartItemWithProduct>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                ci.id AS cart_item_id,
                ci.user_id,
                ci.product_id,
                ci.quantity,
                ci.created_at AS item_created_at,
                ci.updated_at AS item_updated_at,
                p.name,
                p.description,
                p.price,
                p.stock,
                p.image_url,
                p.status,
                p.created_at AS product_created_at,
                p.updated_at AS product_updated_at
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = ?
             ORDER BY ci.id ASC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(joined_from_row).collect()
    }

    async fn insert(&self, item: &NewCartItem) -> Result<CartItem, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO cart_items (user_id, product_id, quantity, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(item.user_id.0)
        .bind(item.product_id.0)
        .bind(i64::from(item.quantity))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(CartItem {
            id: CartItemId(result.last_insert_rowid()),
            user_id: item.user_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE cart_items SET quantity = ?, updated_at = ? WHERE id = ?")
                .bind(i64::from(quantity))
                .bind(now.to_rfc3339())
                .bind(id.0)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        }

        let updated = self.find_by_id(id).await?;
        updated.ok_or_else(|| RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn delete(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM cart_items WHERE user_id = ?")
            .bind(user_id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

fn cart_item_from_row(row: SqliteRow) -> Result<CartItem, RepositoryError> {
    Ok(CartItem {
        id: CartItemId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        product_id: ProductId(row.try_get("product_id")?),
        quantity: parse_u32("quantity", row.try_get("quantity")?)?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}

fn joined_from_row(row: SqliteRow) -> Result<CartItemWithProduct, RepositoryError> {
    let product_id = ProductId(row.try_get("product_id")?);

    let status_raw = row.try_get::<String, _>("status")?;
    let status = ProductStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown product status `{status_raw}`")))?;

    let price_raw = row.try_get::<String, _>("price")?;
    let price = Decimal::from_str(&price_raw).map_err(|error| {
        RepositoryError::Decode(format!("invalid price `{price_raw}` ({error})"))
    })?;

    let item = CartItem {
        id: CartItemId(row.try_get("cart_item_id")?),
        user_id: UserId(row.try_get("user_id")?),
        product_id,
        quantity: parse_u32("quantity", row.try_get("quantity")?)?,
        created_at: parse_timestamp("item_created_at", row.try_get("item_created_at")?)?,
        updated_at: parse_timestamp("item_updated_at", row.try_get("item_updated_at")?)?,
    };

    let product = Product {
        id: product_id,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price,
        stock: parse_u32("stock", row.try_get("stock")?)?,
        image_url: row.try_get("image_url")?,
        status,
        created_at: parse_timestamp("product_created_at", row.try_get("product_created_at")?)?,
        updated_at: parse_timestamp("product_updated_at", row.try_get("product_updated_at")?)?,
    };

    Ok(CartItemWithProduct { item, product })
}
