//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregation::aggregate;
use crate::calculation::{RunStatus, run_payroll};

use super::request::{PaymentsRequest, ReportsRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payments", post(payments_handler))
        .route("/reports", post(reports_handler))
        .with_state(state)
}

/// Handler for POST /payments.
///
/// Runs payroll for the requested month. Employees that fail are reported in
/// the run's `failures`; the response is still 200.
async fn payments_handler(
    State(state): State<AppState>,
    payload: Result<Json<PaymentsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payments request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let input = match request.into_input() {
        Ok(input) => input,
        Err(err) => return error_response(correlation_id, err.into()),
    };

    let start_time = Instant::now();
    match run_payroll(state.config(), &input) {
        Ok(run) => {
            let failed = match run.status() {
                RunStatus::Complete => 0,
                RunStatus::Partial { failed } => failed,
            };
            info!(
                correlation_id = %correlation_id,
                run_id = %run.run_id,
                period = %run.period.label(),
                computed = run.results.len(),
                failed,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll run completed"
            );
            json_response(StatusCode::OK, &run)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Payroll run failed");
            error_response(correlation_id, err.into())
        }
    }
}

/// Handler for POST /reports.
///
/// Aggregates the submitted results into the FS3, FS5 and FS7 totals of the
/// requested month.
async fn reports_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reports request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let period = match request.period() {
        Ok(period) => period,
        Err(err) => return error_response(correlation_id, err.into()),
    };
    if let Err(err) = state.config().tables.ensure_year(period.year) {
        return error_response(correlation_id, err.into());
    }

    let totals = aggregate(&request.results, &period);
    info!(
        correlation_id = %correlation_id,
        period = %period.label(),
        results = request.results.len(),
        fs3 = totals.fs3.len(),
        "Reports aggregated"
    );
    json_response(StatusCode::OK, &totals)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: ApiErrorResponse) -> Response {
    warn!(
        correlation_id = %correlation_id,
        code = %error.error.code,
        status = error.status.as_u16(),
        "Request rejected"
    );
    error.into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::OrganisationTotals;
    use crate::calculation::PayrollRun;
    use crate::config::ConfigLoader;
    use crate::models::Employee;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn create_test_loader() -> ConfigLoader {
        ConfigLoader::load("./data/sample", 2024).expect("Failed to load config")
    }

    fn create_valid_request(month: u32) -> PaymentsRequest {
        let loader = create_test_loader();
        PaymentsRequest {
            year: 2024,
            month,
            employees: loader.load_employees().unwrap().employees,
            adjustments: loader.load_adjustments().unwrap(),
            history: Vec::new(),
        }
    }

    async fn send_post(router: Router, uri: &str, body: String) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn read_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn router() -> Router {
        create_router(AppState::new(create_test_loader().into_config()))
    }

    #[tokio::test]
    async fn test_api_001_valid_payments_request_returns_200() {
        let body = serde_json::to_string(&create_valid_request(3)).unwrap();

        let response = send_post(router(), "/payments", body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let run: PayrollRun = read_body(response).await;
        assert_eq!(run.results.len(), 4);
        assert_eq!(run.skipped, vec!["emp-002"]);
        assert!(run.failures.is_empty());
        assert!(run.results.iter().all(|r| r.net_pay_identity_holds()));
        assert!(run.results.iter().all(|r| r.gross_pay > Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let response = send_post(router(), "/payments", "{invalid json".to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_employees_returns_400() {
        let response = send_post(
            router(),
            "/payments",
            r#"{"year": 2024, "month": 3}"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("employees"));
    }

    #[tokio::test]
    async fn test_api_004_invalid_month_returns_400() {
        let body = serde_json::to_string(&create_valid_request(13)).unwrap();

        let response = send_post(router(), "/payments", body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "INVALID_PERIOD");
    }

    #[tokio::test]
    async fn test_api_005_unknown_category_is_isolated() {
        let mut request = create_valid_request(3);
        let mut broken: Employee = request.employees[0].clone();
        broken.id = "emp-099".to_string();
        broken.social_security_category = "Z".to_string();
        request.employees.push(broken);
        let body = serde_json::to_string(&request).unwrap();

        let response = send_post(router(), "/payments", body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let run: PayrollRun = read_body(response).await;
        assert_eq!(run.results.len(), 4);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].employee_id, "emp-099");
        assert_eq!(run.status(), RunStatus::Partial { failed: 1 });
    }

    #[tokio::test]
    async fn test_api_006_other_year_returns_400() {
        let mut request = create_valid_request(3);
        request.year = 2025;
        let body = serde_json::to_string(&request).unwrap();

        let response = send_post(router(), "/payments", body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "UNSUPPORTED_YEAR");
    }

    #[tokio::test]
    async fn test_api_007_reports_aggregate_results() {
        let body = serde_json::to_string(&create_valid_request(3)).unwrap();
        let run: PayrollRun = read_body(send_post(router(), "/payments", body).await).await;

        let reports = ReportsRequest {
            year: 2024,
            month: 3,
            results: run.results.clone(),
        };
        let response = send_post(
            router(),
            "/reports",
            serde_json::to_string(&reports).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let totals: OrganisationTotals = read_body(response).await;
        assert_eq!(totals, run.totals);
        assert_eq!(totals.fs5.payees(), 4);
        assert_eq!(totals.fs5.payees_part_time, 1);
    }
}
