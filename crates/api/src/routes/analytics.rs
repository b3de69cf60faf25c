//! Analytics routes: period reports, department spend and customer stats.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use pdj_core::analytics::OrderScope;
use pdj_core::period::PeriodToken;
use pdj_shared::types::{BusinessId, UserId};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::PeriodParams;
use crate::{
    AppState,
    error::{bad_request, database_error, error_response},
};

/// Upper bound of customers per stats request.
const MAX_CUSTOMERS_PER_REQUEST: usize = 100;

/// Creates the analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/businesses/{business_id}/analytics",
            get(business_analytics),
        )
        .route("/users/{user_id}/analytics", get(user_analytics))
        .route(
            "/businesses/{business_id}/departments",
            get(department_breakdown),
        )
        .route("/customers/stats", get(customer_stats))
}

/// Query parameters for customer statistics.
#[derive(Debug, Deserialize)]
pub struct CustomerStatsParams {
    /// Comma-separated customer IDs.
    pub ids: String,
}

/// GET `/businesses/{business_id}/analytics` - Report over business-billed orders.
async fn business_analytics(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let token = match params.token() {
        Ok(token) => token,
        Err(response) => return response,
    };
    scoped_report(
        &state,
        OrderScope::Business(BusinessId::from_uuid(business_id)),
        token,
    )
    .await
}

/// GET `/users/{user_id}/analytics` - Report over one customer's orders.
async fn user_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let token = match params.token() {
        Ok(token) => token,
        Err(response) => return response,
    };
    scoped_report(&state, OrderScope::User(UserId::from_uuid(user_id)), token).await
}

/// Serves a report from the cache, computing and caching it on a miss.
async fn scoped_report(state: &AppState, scope: OrderScope, token: PeriodToken) -> Response {
    if let Some(report) = state.cache.get(scope, token) {
        return (StatusCode::OK, Json(report.as_ref())).into_response();
    }

    let generation = state.cache.generation(scope);
    match state.analytics().report(scope, token, Utc::now()).await {
        Ok(report) => {
            let report = state.cache.insert_if_current(scope, token, report, generation);
            (StatusCode::OK, Json(report.as_ref())).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/businesses/{business_id}/departments` - Spend per department.
async fn department_breakdown(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let token = match params.token() {
        Ok(token) => token,
        Err(response) => return response,
    };
    let business_id = BusinessId::from_uuid(business_id);

    let employees = match state.businesses().employees(business_id).await {
        Ok(employees) => employees,
        Err(e) => return database_error(&e),
    };

    match state
        .analytics()
        .department_breakdown(business_id, token, Utc::now(), &employees)
        .await
    {
        Ok(departments) => (
            StatusCode::OK,
            Json(json!({
                "business_id": business_id,
                "period": token,
                "departments": departments
            })),
        )
            .into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/customers/stats?ids=…` - Per-customer statistics.
///
/// A customer whose history cannot be loaded is returned with default values
/// and `loaded: false`; the rest of the batch is unaffected.
async fn customer_stats(
    State(state): State<AppState>,
    Query(params): Query<CustomerStatsParams>,
) -> impl IntoResponse {
    let ids = match parse_ids(&params.ids) {
        Ok(ids) => ids,
        Err(message) => return bad_request(message),
    };

    let stats = state.analytics().customer_statistics(&ids).await;
    (StatusCode::OK, Json(json!({ "customers": stats }))).into_response()
}

fn parse_ids(raw: &str) -> Result<Vec<UserId>, String> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map(UserId::from_uuid)
                .map_err(|_| format!("Invalid customer ID: {s}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err("At least one customer ID is required".to_string());
    }
    if ids.len() > MAX_CUSTOMERS_PER_REQUEST {
        return Err(format!(
            "At most {MAX_CUSTOMERS_PER_REQUEST} customers per request"
        ));
    }
    Ok(ids)
}
