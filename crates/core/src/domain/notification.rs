use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub i64);

/// Category of a user notification. Stored as an uppercase string
/// column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderConfirmed,
    OrderShipped,
    OrderDelivered,
    Restock,
    CouponIssued,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderConfirmed => "ORDER_CONFIRMED",
            Self::OrderShipped => "ORDER_SHIPPED",
            Self::OrderDelivered => "ORDER_DELIVERED",
            Self::Restock => "RESTOCK",
            Self::CouponIssued => "COUPON_ISSUED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ORDER_CONFIRMED" => Some(Self::OrderConfirmed),
            "ORDER_SHIPPED" => Some(Self::OrderShipped),
            "ORDER_DELIVERED" => Some(Self::OrderDelivered),
            "RESTOCK" => Some(Self::Restock),
            "COUPON_ISSUED" => Some(Self::CouponIssued),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationType,
    pub title: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert record for a notification; `read` starts false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationType,
    pub title: String,
    pub content: String,
}
