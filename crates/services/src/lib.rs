pub mod cart;
pub mod error;
pub mod notification;

pub use cart::{CartItemView, CartService};
pub use error::{ErrorKind, ServiceError};
pub use notification::NotificationService;
