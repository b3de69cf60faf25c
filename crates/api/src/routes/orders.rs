//! Order routes: checkout and status changes.
//!
//! Every write drops the cached analytics of the affected customer and
//! business.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use pdj_core::analytics::OrderScope;
use pdj_core::order::{NewOrder, Order, OrderStatus};
use pdj_shared::AppError;
use pdj_shared::types::OrderId;
use uuid::Uuid;

use super::StatusRequest;
use crate::{
    AppState,
    error::{error_response, map_order_error},
};

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/status", post(update_status))
}

fn invalidate_reports(state: &AppState, order: &Order) {
    state.cache.invalidate_scope(OrderScope::User(order.user_id));
    if let Some(business_id) = order.business_id {
        state.cache.invalidate_scope(OrderScope::Business(business_id));
    }
}

/// POST `/orders` - Place an order and assign its number.
async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> impl IntoResponse {
    match state.orders().create_order(payload, Utc::now()).await {
        Ok(order) => {
            invalidate_reports(&state, &order);
            (StatusCode::CREATED, Json(order)).into_response()
        }
        Err(e) => error_response(&map_order_error(e)),
    }
}

/// GET `/orders/{order_id}` - Order with its items.
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let order_id = OrderId::from_uuid(order_id);
    match state.orders().find_by_id(order_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => error_response(&AppError::NotFound(format!("Order {order_id}"))),
        Err(e) => error_response(&map_order_error(e)),
    }
}

/// POST `/orders/{order_id}/status` - Advance or cancel an order.
async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> impl IntoResponse {
    let next = match payload.status.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(e) => return error_response(&e.into()),
    };

    match state
        .orders()
        .update_status(OrderId::from_uuid(order_id), next, Utc::now())
        .await
    {
        Ok(order) => {
            invalidate_reports(&state, &order);
            (StatusCode::OK, Json(order)).into_response()
        }
        Err(e) => error_response(&map_order_error(e)),
    }
}
