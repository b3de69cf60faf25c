//! Mapping of domain and repository errors to HTTP responses.
//!
//! Every error body has the shape `{"error": <code>, "message": <text>}`.
//! Retryable failures also carry a `Retry-After` header.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use pdj_db::repositories::{BudgetRepositoryError, BusinessRepositoryError, OrderRepositoryError};
use pdj_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Seconds a client should wait before retrying a timed-out or upstream failure.
const RETRY_AFTER_SECS: u32 = 5;

/// Renders an application error.
///
/// Server-side failures are logged and answered with a generic message.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match err {
        AppError::Database(_) | AppError::Internal(_) => {
            error!(error = %err, "Request failed");
            "An error occurred".to_string()
        }
        _ => err.to_string(),
    };

    let mut response = (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message
        })),
    )
        .into_response();

    if err.is_retryable() {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
    }
    response
}

/// Renders a raw database failure.
pub fn database_error(err: &DbErr) -> Response {
    error_response(&AppError::Database(err.to_string()))
}

/// Renders a request validation failure.
pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(&AppError::Validation(message.into()))
}

/// Maps order repository errors.
pub fn map_order_error(err: OrderRepositoryError) -> AppError {
    match err {
        OrderRepositoryError::Invalid(e) => e.into(),
        OrderRepositoryError::Numbering(e) => e.into(),
        OrderRepositoryError::NotFound(id) => AppError::NotFound(format!("Order {id}")),
        OrderRepositoryError::ConcurrentUpdate(_) | OrderRepositoryError::NumberConflict(_) => {
            AppError::Conflict(err.to_string())
        }
        OrderRepositoryError::Database(e) => AppError::Database(e.to_string()),
    }
}

/// Maps budget repository errors.
pub fn map_budget_repository_error(err: BudgetRepositoryError) -> AppError {
    match err {
        BudgetRepositoryError::InvalidPeriod | BudgetRepositoryError::NegativeAmount => {
            AppError::Validation(err.to_string())
        }
        BudgetRepositoryError::Database(e) => AppError::Database(e.to_string()),
    }
}

/// Maps business repository errors.
pub fn map_business_error(err: BusinessRepositoryError) -> AppError {
    match err {
        BusinessRepositoryError::NotFound(id) => AppError::NotFound(format!("Business {id}")),
        BusinessRepositoryError::DuplicateTaxId(_) | BusinessRepositoryError::DuplicateEmail(_) => {
            AppError::Conflict(err.to_string())
        }
        BusinessRepositoryError::NegativeBudget => AppError::Validation(err.to_string()),
        BusinessRepositoryError::Database(e) => AppError::Database(e.to_string()),
    }
}
