//! Budget routes: active budget status, budget creation and deactivation,
//! and employee spend.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use pdj_core::analytics::{OrderQuery, OrderScope};
use pdj_core::budget::BudgetTracker;
use pdj_core::period::{PeriodResolver, PeriodToken};
use pdj_db::repositories::CreateBudgetInput;
use pdj_shared::AppError;
use pdj_shared::types::{BudgetId, BusinessId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{database_error, error_response, map_budget_repository_error},
};

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/businesses/{business_id}/budgets", post(create_budget))
        .route(
            "/businesses/{business_id}/budgets/active",
            get(active_budget),
        )
        .route(
            "/businesses/{business_id}/employees/spending",
            get(employee_spending),
        )
        .route("/budgets/{budget_id}/deactivate", post(deactivate_budget))
}

/// Query parameters for the active budget lookup.
#[derive(Debug, Deserialize)]
pub struct ActiveBudgetParams {
    /// Department to prefer; falls back to the company-wide budget.
    pub department: Option<String>,
}

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    /// Budget name.
    pub name: String,
    /// Department, or none for company-wide.
    pub department: Option<String>,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Amount allotted.
    pub total_budget: Decimal,
}

/// POST `/businesses/{business_id}/budgets` - Create a budget.
async fn create_budget(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<CreateBudgetRequest>,
) -> impl IntoResponse {
    let input = CreateBudgetInput {
        business_id: BusinessId::from_uuid(business_id),
        name: payload.name,
        department: payload.department,
        period_start: payload.period_start,
        period_end: payload.period_end,
        total_budget: payload.total_budget,
    };

    match state.budgets().create(input, Utc::now()).await {
        Ok(budget) => {
            info!(
                business_id = %budget.business_id,
                budget_id = %budget.id,
                total_budget = %budget.total_budget,
                "Budget created"
            );
            (StatusCode::CREATED, Json(budget)).into_response()
        }
        Err(e) => error_response(&map_budget_repository_error(e)),
    }
}

/// POST `/budgets/{budget_id}/deactivate` - Retire a budget so it is no longer selected.
async fn deactivate_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<Uuid>,
) -> impl IntoResponse {
    let budget_id = BudgetId::from_uuid(budget_id);
    match state.budgets().deactivate(budget_id).await {
        Ok(true) => {
            info!(%budget_id, "Budget deactivated");
            (
                StatusCode::OK,
                Json(json!({ "budget_id": budget_id, "is_active": false })),
            )
                .into_response()
        }
        Ok(false) => error_response(&AppError::NotFound(format!("Budget {budget_id}"))),
        Err(e) => database_error(&e),
    }
}

/// GET `/businesses/{business_id}/budgets/active` - Status of the budget in force today.
async fn active_budget(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
    Query(params): Query<ActiveBudgetParams>,
) -> impl IntoResponse {
    let today = PeriodResolver::new(state.timezone()).local_date(Utc::now());

    match BudgetTracker::active_status(
        &state.budgets(),
        BusinessId::from_uuid(business_id),
        params.department.as_deref(),
        today,
    )
    .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/businesses/{business_id}/employees/spending` - Month-to-date spend per active employee.
async fn employee_spending(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> impl IntoResponse {
    let business_id = BusinessId::from_uuid(business_id);
    let analytics = state.analytics();

    let month = match analytics
        .resolver()
        .interval(PeriodToken::CurrentMonth, Utc::now())
    {
        Ok(interval) => interval,
        Err(e) => return error_response(&e.into()),
    };

    let employees = match state.businesses().active_employees(business_id).await {
        Ok(employees) => employees,
        Err(e) => return database_error(&e),
    };

    let orders = match analytics
        .fetch(&OrderQuery::within(OrderScope::Business(business_id), month))
        .await
    {
        Ok(orders) => orders,
        Err(e) => return error_response(&e.into()),
    };

    let spending = BudgetTracker::employee_spending(&employees, &orders);
    (
        StatusCode::OK,
        Json(json!({
            "business_id": business_id,
            "period_start": month.start,
            "period_end": month.end,
            "employees": spending
        })),
    )
        .into_response()
}
