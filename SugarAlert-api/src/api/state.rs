use std::sync::Arc;

use sugar_alert_domain::health::{HealthService, HealthServiceTrait};
use sugar_alert_domain::llm::LanguageModel;
use sugar_alert_domain::scheduler::JobScheduler;
use sugar_alert_domain::services::{ReminderService, SugarCheckService};
use sugar_alert_domain::sms::AlertDispatcher;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sugar_check: Arc<SugarCheckService>,
    pub reminders: Arc<ReminderService>,
    pub health: Arc<dyn HealthServiceTrait>,
    pub environment: String,
}

impl AppState {
    /// Wire the services from their outbound dependencies and a running scheduler
    pub fn new(
        model: Arc<dyn LanguageModel>,
        dispatcher: Arc<dyn AlertDispatcher>,
        scheduler: JobScheduler,
    ) -> Self {
        Self {
            sugar_check: Arc::new(SugarCheckService::new(model, Arc::clone(&dispatcher))),
            reminders: Arc::new(ReminderService::new(scheduler.clone(), dispatcher)),
            health: Arc::new(HealthService::new(scheduler)),
            environment: "development".to_string(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}
