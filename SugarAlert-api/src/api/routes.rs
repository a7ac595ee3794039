use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use crate::api::handlers::{health, reminder, sugar_alert};
use crate::api::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/check_sugar_alert", post(sugar_alert::check_sugar_alert))
        .route("/schedule_reminder", post(reminder::schedule_reminder));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .with_state(state);

    debug!("API routes configured");

    let app = add_swagger_ui(app);

    // Browser dashboards call the API from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
