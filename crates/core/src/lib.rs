pub mod config;
pub mod domain;
pub mod errors;

pub use chrono;

pub use domain::cart::{CartItem, CartItemId, CartItemWithProduct, NewCartItem};
pub use domain::notification::{
    NewNotification, Notification, NotificationId, NotificationType,
};
pub use domain::product::{Product, ProductId, ProductStatus};
pub use domain::user::{User, UserId};
pub use errors::DomainError;
