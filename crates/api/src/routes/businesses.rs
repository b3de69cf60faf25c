//! Business and employee management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use pdj_core::business::{EmployeeRole, EmployeeStatus};
use pdj_db::repositories::{CreateBusinessInput, CreateEmployeeInput};
use pdj_shared::AppError;
use pdj_shared::types::{BusinessId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{database_error, error_response, map_business_error},
};

/// Creates the business routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", post(create_business))
        .route("/businesses/{business_id}", get(get_business))
        .route(
            "/businesses/{business_id}/employees",
            get(list_employees).post(add_employee),
        )
}

/// Request body for registering a business.
#[derive(Debug, Deserialize)]
pub struct CreateBusinessRequest {
    /// Legal name.
    pub name: String,
    /// Tax registration number.
    pub tax_id: Option<String>,
    /// Where invoices are sent.
    pub billing_email: String,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Account manager.
    pub manager_user_id: Option<Uuid>,
}

/// Request body for adding an employee.
#[derive(Debug, Deserialize)]
pub struct AddEmployeeRequest {
    /// Linked customer account.
    pub user_id: Option<Uuid>,
    /// Full name.
    pub name: String,
    /// Work email.
    pub email: String,
    /// Department name.
    pub department: Option<String>,
    /// Monthly allowance.
    #[serde(default)]
    pub monthly_budget: Decimal,
    /// Role; defaults to `employee`.
    pub role: Option<EmployeeRole>,
    /// Status; defaults to `invited`.
    pub status: Option<EmployeeStatus>,
}

/// POST `/businesses` - Register a business.
async fn create_business(
    State(state): State<AppState>,
    Json(payload): Json<CreateBusinessRequest>,
) -> impl IntoResponse {
    let input = CreateBusinessInput {
        name: payload.name,
        tax_id: payload.tax_id,
        billing_email: payload.billing_email,
        billing_address: payload.billing_address,
        manager_user_id: payload.manager_user_id.map(UserId::from_uuid),
    };

    match state.businesses().create(input, Utc::now()).await {
        Ok(business) => {
            info!(business_id = %business.id, name = %business.name, "Business registered");
            (StatusCode::CREATED, Json(business)).into_response()
        }
        Err(e) => error_response(&map_business_error(e)),
    }
}

/// GET `/businesses/{business_id}` - Business details.
async fn get_business(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> impl IntoResponse {
    let business_id = BusinessId::from_uuid(business_id);
    match state.businesses().find_by_id(business_id).await {
        Ok(Some(business)) => (StatusCode::OK, Json(business)).into_response(),
        Ok(None) => error_response(&AppError::NotFound(format!("Business {business_id}"))),
        Err(e) => database_error(&e),
    }
}

/// GET `/businesses/{business_id}/employees` - Every employee.
async fn list_employees(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .businesses()
        .employees(BusinessId::from_uuid(business_id))
        .await
    {
        Ok(employees) => (StatusCode::OK, Json(json!({ "employees": employees }))).into_response(),
        Err(e) => database_error(&e),
    }
}

/// POST `/businesses/{business_id}/employees` - Add an employee.
async fn add_employee(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<AddEmployeeRequest>,
) -> impl IntoResponse {
    let input = CreateEmployeeInput {
        business_id: BusinessId::from_uuid(business_id),
        user_id: payload.user_id.map(UserId::from_uuid),
        name: payload.name,
        email: payload.email,
        department: payload.department,
        monthly_budget: payload.monthly_budget,
        status: payload.status.unwrap_or(EmployeeStatus::Invited),
        role: payload.role.unwrap_or(EmployeeRole::Employee),
    };

    match state.businesses().add_employee(input, Utc::now()).await {
        Ok(employee) => {
            info!(
                business_id = %employee.business_id,
                employee_id = %employee.id,
                "Employee added"
            );
            (StatusCode::CREATED, Json(employee)).into_response()
        }
        Err(e) => error_response(&map_business_error(e)),
    }
}
