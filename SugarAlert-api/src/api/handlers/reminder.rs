use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use crate::api::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::reminder::{ScheduleReminderRequest, ScheduleReminderResponse, MISSING_SCHEDULING_FIELDS};

/// Schedule a one-shot medication reminder SMS
#[utoipa::path(
    post,
    path = "/api/schedule_reminder",
    request_body = ScheduleReminderRequest,
    responses(
        (status = 200, description = "Reminder scheduled", body = ScheduleReminderResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Unparseable time or scheduler failure", body = ErrorResponse),
    ),
    tag = "reminders"
)]
#[instrument(skip(state, payload))]
pub async fn schedule_reminder(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleReminderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Unreadable reminder body: {}", rejection);
        ErrorResponse::bad_request(MISSING_SCHEDULING_FIELDS).into_response()
    })?;

    let request = request.into_domain().map_err(|e| {
        warn!("Invalid reminder request: {}", e);
        ErrorResponse::bad_request(MISSING_SCHEDULING_FIELDS).into_response()
    })?;

    match state.reminders.schedule(request) {
        Ok(job) => {
            info!(job_id = %job.id, "Reminder for {} scheduled at {}", job.medication_name, job.run_at);
            Ok((StatusCode::OK, Json(ScheduleReminderResponse::from(job))))
        }
        Err(e) => {
            error!("Failed to schedule reminder: {}", e);
            Err(ErrorResponse::internal_error(format!("Scheduling error: {}", e)).into_response())
        }
    }
}
