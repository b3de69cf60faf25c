//! Invoice routes: monthly generation, listing and lifecycle.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use pdj_core::invoice::{InvoiceStatus, InvoiceStore};
use pdj_shared::AppError;
use pdj_shared::types::{BusinessId, InvoiceId, PageRequest};
use serde::Deserialize;
use uuid::Uuid;

use super::StatusRequest;
use crate::{
    AppState,
    error::{database_error, error_response},
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/businesses/{business_id}/invoices",
            get(list_invoices).post(generate_invoice),
        )
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/status", post(update_status))
}

/// Request body for generating a monthly invoice.
#[derive(Debug, Deserialize)]
pub struct GenerateInvoiceRequest {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

/// POST `/businesses/{business_id}/invoices` - Generate the invoice of a month.
async fn generate_invoice(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<GenerateInvoiceRequest>,
) -> impl IntoResponse {
    match state
        .invoices()
        .generate(
            BusinessId::from_uuid(business_id),
            payload.year,
            payload.month,
            Utc::now(),
        )
        .await
    {
        Ok(invoice) => (StatusCode::CREATED, Json(invoice)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/businesses/{business_id}/invoices` - Paginated invoices, newest period first.
async fn list_invoices(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state
        .invoice_repository()
        .list_for_business(BusinessId::from_uuid(business_id), &page)
        .await
    {
        Ok(invoices) => (StatusCode::OK, Json(invoices)).into_response(),
        Err(e) => database_error(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Invoice details.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let invoice_id = InvoiceId::from_uuid(invoice_id);
    match state.invoice_repository().get(invoice_id).await {
        Ok(Some(invoice)) => (StatusCode::OK, Json(invoice)).into_response(),
        Ok(None) => error_response(&AppError::NotFound(format!("Invoice {invoice_id}"))),
        Err(e) => error_response(&e.into()),
    }
}

/// POST `/invoices/{invoice_id}/status` - Move an invoice along its lifecycle.
async fn update_status(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> impl IntoResponse {
    let next = match payload.status.parse::<InvoiceStatus>() {
        Ok(status) => status,
        Err(e) => return error_response(&e.into()),
    };

    match state
        .invoices()
        .transition(InvoiceId::from_uuid(invoice_id), next, Utc::now())
        .await
    {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}
