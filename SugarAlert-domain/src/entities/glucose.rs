use serde::{Deserialize, Serialize};
use sugar_alert_data::sms::DeliveryResult;

/// Placeholder used for context the client did not send
pub const CONTEXT_NOT_INTEGRATED: &str = "Data not integrated";

/// A single glucose measurement submitted for an alert check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Current blood sugar in mg/dL
    pub current_sugar: f64,
    /// Number the patient can be reached at
    pub recipient_number: String,
    /// Patient-specific upper target in mg/dL
    pub user_target_max: Option<f64>,
    pub time_since_meal: String,
    pub last_meal_carbs: String,
    pub recent_activity: String,
}

impl Reading {
    /// Create a reading with every optional context field set to the placeholder
    pub fn new(current_sugar: f64, recipient_number: impl Into<String>) -> Self {
        Self {
            current_sugar,
            recipient_number: recipient_number.into(),
            user_target_max: None,
            time_since_meal: CONTEXT_NOT_INTEGRATED.to_string(),
            last_meal_carbs: CONTEXT_NOT_INTEGRATED.to_string(),
            recent_activity: CONTEXT_NOT_INTEGRATED.to_string(),
        }
    }

    pub fn with_target_max(mut self, target_max: Option<f64>) -> Self {
        self.user_target_max = target_max;
        self
    }

    /// Fill the meal and activity context; `None` keeps the placeholder
    pub fn with_context(
        mut self,
        time_since_meal: Option<String>,
        last_meal_carbs: Option<String>,
        recent_activity: Option<String>,
    ) -> Self {
        if let Some(value) = time_since_meal {
            self.time_since_meal = value;
        }
        if let Some(value) = last_meal_carbs {
            self.last_meal_carbs = value;
        }
        if let Some(value) = recent_activity {
            self.recent_activity = value;
        }
        self
    }
}

/// Outcome of a sugar check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDecision {
    /// Whether the model asked for an alert
    pub triggered: bool,
    /// Model free text, or the detail of the last delivery attempt
    pub message: String,
    /// One entry per dispatched alert
    pub deliveries: Vec<DeliveryResult>,
}

impl AlertDecision {
    pub fn no_alert(message: impl Into<String>) -> Self {
        Self {
            triggered: false,
            message: message.into(),
            deliveries: Vec::new(),
        }
    }
}
