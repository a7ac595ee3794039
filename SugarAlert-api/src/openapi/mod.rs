use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::sugar_alert::check_sugar_alert,
        crate::api::handlers::reminder::schedule_reminder
    ),
    components(
        schemas(
            crate::entities::sugar_alert::CheckSugarAlertRequest,
            crate::entities::sugar_alert::CheckSugarAlertResponse,
            crate::entities::reminder::ScheduleReminderRequest,
            crate::entities::reminder::ScheduleReminderResponse,
            crate::entities::common::ErrorResponse,

            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "alerts", description = "Model-driven glucose alert checks"),
        (name = "reminders", description = "Medication reminder scheduling")
    ),
    info(
        title = "SugarAlert API",
        version = "0.1.0",
        description = "Glucose alerting and medication reminders over SMS",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
