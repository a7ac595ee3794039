use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use crate::api::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::sugar_alert::{CheckSugarAlertRequest, CheckSugarAlertResponse, MISSING_READING_FIELDS};

/// Ask the model whether a reading needs an alert, sending it if so
#[utoipa::path(
    post,
    path = "/api/check_sugar_alert",
    request_body = CheckSugarAlertRequest,
    responses(
        (status = 200, description = "Reading checked", body = CheckSugarAlertResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Model or internal failure", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(state, payload))]
pub async fn check_sugar_alert(
    State(state): State<AppState>,
    payload: Result<Json<CheckSugarAlertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Unreadable sugar check body: {}", rejection);
        ErrorResponse::bad_request(MISSING_READING_FIELDS).into_response()
    })?;

    let (reading, sugar_level) = request.into_reading().map_err(|e| {
        warn!("Invalid sugar check request: {}", e);
        ErrorResponse::bad_request(MISSING_READING_FIELDS).into_response()
    })?;

    info!("Checking sugar reading of {} mg/dL", reading.current_sugar);

    match state.sugar_check.check(&reading).await {
        Ok(decision) => {
            info!("Sugar check complete, alert triggered: {}", decision.triggered);
            Ok((
                StatusCode::OK,
                Json(CheckSugarAlertResponse::from_decision(sugar_level, decision)),
            ))
        }
        Err(e) => {
            error!("Sugar check failed: {}", e);
            Err(ErrorResponse::internal_error(format!(
                "Internal Server Error during Agent processing: {}",
                e
            ))
            .into_response())
        }
    }
}
