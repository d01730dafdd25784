use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use basket_core::domain::product::{Product, ProductId, ProductStatus};

use super::{parse_timestamp, parse_u32, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id,
                name,
                description,
                price,
                stock,
                image_url,
                status,
                created_at,
                updated_at
             FROM products
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(product_from_row).transpose()
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products (
                id,
                name,
                description,
                price,
                stock,
                image_url,
                status,
                created_at,
                updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                price = excluded.price,
                stock = excluded.stock,
                image_url = excluded.image_url,
                status = excluded.status,
                updated_at = excluded.updated_at",
        )
        .bind(product.id.0)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(i64::from(product.stock))
        .bind(&product.image_url)
        .bind(product.status.as_str())
        .bind(product.created_at.to_rfc3339())
        .bind(product.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub(crate) fn product_from_row(row: SqliteRow) -> Result<Product, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = ProductStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown product status `{status_raw}`")))?;

    let price_raw = row.try_get::<String, _>("price")?;
    let price = Decimal::from_str(&price_raw).map_err(|error| {
        RepositoryError::Decode(format!("invalid price `{price_raw}` ({error})"))
    })?;

    Ok(Product {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price,
        stock: parse_u32("stock", row.try_get("stock")?)?,
        image_url: row.try_get("image_url")?,
        status,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}
