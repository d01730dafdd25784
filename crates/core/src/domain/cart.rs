use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};
use super::user::UserId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemId(pub i64);

/// One line of a user's cart: a (user, product, quantity) row. At most
/// one row exists per (user, product) pair; repeat adds fold into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert record for a cart line. Built through [`NewCartItem::new`] so
/// a zero quantity can never reach storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl NewCartItem {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: u32) -> Result<Self, DomainError> {
        validate_quantity(quantity)?;
        Ok(Self { user_id, product_id, quantity })
    }
}

/// A cart line with its product row attached, as returned by the
/// list-cart storage contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemWithProduct {
    pub item: CartItem,
    pub product: Product,
}

pub fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::ZeroQuantity);
    }
    Ok(())
}
