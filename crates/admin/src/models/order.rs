//! Orders and line items.
//!
//! Orders are created by the storefront checkout; the admin API only reads
//! them and updates their fulfillment and payment status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use backoffice_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId};

/// An order with the purchasing user's name and email resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub total_amount: Decimal,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. Product fields are `None` if the product was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    /// Unit price at the time of purchase.
    pub price: Decimal,
}

/// `GET /api/orders/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Status change requested by an admin. At least one field is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderUpdate {
    /// `None` when neither field is present.
    #[must_use]
    pub const fn new(
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Option<Self> {
        if status.is_none() && payment_status.is_none() {
            return None;
        }
        Some(Self {
            status,
            payment_status,
        })
    }
}
