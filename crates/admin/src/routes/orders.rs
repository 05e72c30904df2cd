//! Order handlers. Orders are listed, inspected and moved between statuses;
//! they are never created or deleted here.

use std::str::FromStr;

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::{OrderId, OrderStatus, PaymentStatus};

use super::not_found;
use crate::db::{ListParams, OrderRepository, Paginated};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderDetail, OrderUpdate};
use crate::state::AppState;

const NOT_FOUND: &str = "Order not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/{id}", get(show).put(update))
}

/// `?search=&status=&payment=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
struct OrderListQuery {
    search: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
    status: Option<String>,
    payment: Option<String>,
}

impl OrderListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.search.as_deref(), self.page, self.limit)
    }

    fn status(&self) -> Result<Option<OrderStatus>, AppError> {
        parse_filter(self.status.as_deref())
    }

    fn payment(&self) -> Result<Option<PaymentStatus>, AppError> {
        parse_filter(self.payment.as_deref())
    }
}

/// Blank means no filter.
fn parse_filter<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e: T::Err| AppError::bad_request(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: Option<OrderStatus>,
    #[serde(alias = "paymentStatus")]
    payment_status: Option<PaymentStatus>,
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let (status, payment) = (query.status()?, query.payment()?);
    let page = OrderRepository::new(state.pool())
        .list(&query.params(), status, payment)
        .await?;
    Ok(Json(page))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<OrderId>,
) -> Result<Json<OrderDetail>, AppError> {
    OrderRepository::new(state.pool())
        .get_detail(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(admin, state))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<OrderId>,
    AppJson(payload): AppJson<StatusPayload>,
) -> Result<Json<Value>, AppError> {
    let change = OrderUpdate::new(payload.status, payload.payment_status)
        .ok_or_else(|| AppError::bad_request("Status or payment status is required"))?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, change)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(
        order_id = %order.id,
        status = %order.status,
        payment_status = %order.payment_status,
        admin_id = %admin.id,
        "Order updated"
    );
    Ok(Json(json!({ "message": "Order updated successfully", "order": order })))
}
