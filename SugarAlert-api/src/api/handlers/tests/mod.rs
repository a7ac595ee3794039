
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::api::{create_application, AppState};
use sugar_alert_domain::llm::LanguageModel;
use sugar_alert_domain::scheduler::{JobScheduler, SchedulerConfig};
use sugar_alert_domain::testing::ManualClock;
use sugar_alert_domain::sms::AlertDispatcher;

pub(crate) fn local(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 11, 27, hour, minute, 0).single().unwrap()
}

/// Build the router around stub services and a scheduler frozen at `now`
pub(crate) fn test_app(
    model: Arc<dyn LanguageModel>,
    dispatcher: Arc<dyn AlertDispatcher>,
    now: DateTime<Local>,
) -> (Router, JobScheduler) {
    let scheduler = JobScheduler::start(Arc::new(ManualClock::new(now)), SchedulerConfig::default());
    let state = AppState::new(model, dispatcher, scheduler.clone()).with_environment("test");
    (create_application(state), scheduler)
}

pub(crate) async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
