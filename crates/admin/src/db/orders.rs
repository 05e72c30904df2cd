//! Order repository.
//!
//! Orders are read-only apart from their two status columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use backoffice_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Order, OrderDetail, OrderItem, OrderUpdate};

const COLUMNS: &str = "o.id, o.user_id, u.name AS user_name, u.email AS user_email, \
                       o.status, o.payment_status, o.payment_method, o.total_amount, \
                       o.shipping_address, o.created_at";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "orders o LEFT JOIN users u ON o.user_id = u.id",
    search_columns: &["u.name", "u.email", "o.id::text"],
    order_by: "o.created_at DESC, o.id DESC",
};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    user_name: Option<String>,
    user_email: Option<String>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: Option<String>,
    total_amount: Decimal,
    shipping_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            status: row.status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
        }
    }
}

/// Repository for orders and their line items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, newest first.
    ///
    /// Searches customer name, customer email and the order number; `status`
    /// and `payment_status` narrow the result when set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        params: &ListParams,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Paginated<Order>, RepositoryError> {
        let page = PagedQuery::new(&LIST, params)
            .filter("o.status", status)
            .filter("o.payment_status", payment_status)
            .fetch::<OrderRow>(self.pool)
            .await?;

        Ok(page.map(Order::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM orders o LEFT JOIN users u ON o.user_id = u.id WHERE o.id = $1"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// An order with its line items, product names and images resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id,
                   p.name AS product_name, p.image_url,
                   oi.quantity, oi.price
            FROM order_items oi
            LEFT JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }

    /// Set the fulfillment and/or payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "WITH o AS ( \
                UPDATE orders SET \
                    status = COALESCE($2, status), \
                    payment_status = COALESCE($3, payment_status) \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM o LEFT JOIN users u ON o.user_id = u.id"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(update.status)
            .bind(update.payment_status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
