//! API route definitions.

use axum::{Router, response::Response};
use pdj_core::period::PeriodToken;
use pdj_shared::AppError;
use serde::Deserialize;

use crate::{AppState, error::error_response};

pub mod analytics;
pub mod budgets;
pub mod businesses;
pub mod health;
pub mod invoices;
pub mod orders;

/// Creates the API router with all routes.
///
/// Authentication happens at the gateway; routes take IDs from the path.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(analytics::routes())
        .merge(budgets::routes())
        .merge(businesses::routes())
        .merge(invoices::routes())
        .merge(orders::routes())
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status, by wire name.
    pub status: String,
}

/// Query parameters selecting a reporting period.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    /// Period token such as `30days` or `current_month`; defaults to `30days`.
    pub period: Option<String>,
}

impl PeriodParams {
    /// Parses the requested period, answering 400 for unknown tokens.
    pub fn token(&self) -> Result<PeriodToken, Response> {
        self.period.as_deref().map_or(Ok(PeriodToken::default()), |raw| {
            raw.parse::<PeriodToken>()
                .map_err(|e| error_response(&AppError::from(e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_missing_period_defaults_to_30_days() {
        assert_eq!(PeriodParams::default().token().unwrap(), PeriodToken::Last30Days);
    }

    #[test]
    fn test_unknown_period_is_bad_request() {
        let params = PeriodParams {
            period: Some("fortnight".to_string()),
        };
        let response = params.token().unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_calendar_period_parses() {
        let params = PeriodParams {
            period: Some("last_month".to_string()),
        };
        assert_eq!(params.token().unwrap(), PeriodToken::LastMonth);
    }
}
