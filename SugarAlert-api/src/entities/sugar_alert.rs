use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::common::field_error;
use sugar_alert_domain::entities::{AlertDecision, Reading};

pub const MISSING_READING_FIELDS: &str = "Missing required fields (current_sugar or recipient_number).";
pub const CHECK_COMPLETE_STATUS: &str = "Agent check complete";

/// Request payload for an immediate sugar check
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckSugarAlertRequest {
    /// Current blood sugar in mg/dL
    #[validate(required(message = "current_sugar is required"))]
    #[schema(value_type = Option<f64>, example = json!(190))]
    pub current_sugar: Option<Number>,

    /// Mobile number alerts are sent to
    #[validate(required(message = "recipient_number is required"))]
    pub recipient_number: Option<String>,

    /// Patient-specific upper target in mg/dL
    pub user_target_max: Option<f64>,

    /// Free-text description of the time since the last meal
    pub time_since_meal: Option<String>,

    /// Free-text description of the last meal's carbohydrates
    pub last_meal_carbs: Option<String>,

    /// Free-text description of recent physical activity
    pub recent_activity: Option<String>,
}

impl CheckSugarAlertRequest {
    /// Validate the payload and convert it into a domain reading
    ///
    /// The submitted number is returned alongside so it can be echoed back as sent.
    pub fn into_reading(self) -> Result<(Reading, Number), ValidationErrors> {
        self.validate()?;

        let sugar_level = self
            .current_sugar
            .ok_or_else(|| field_error("current_sugar", "required"))?;
        let recipient_number = self
            .recipient_number
            .filter(|number| !number.trim().is_empty())
            .ok_or_else(|| field_error("recipient_number", "blank"))?;
        let current_sugar = sugar_level
            .as_f64()
            .ok_or_else(|| field_error("current_sugar", "not_a_number"))?;

        let reading = Reading::new(current_sugar, recipient_number)
            .with_target_max(self.user_target_max)
            .with_context(self.time_since_meal, self.last_meal_carbs, self.recent_activity);

        Ok((reading, sugar_level))
    }
}

/// Result of a sugar check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckSugarAlertResponse {
    /// Always "Agent check complete"
    pub status: String,

    /// The reading that was checked, echoed back as submitted
    #[schema(value_type = f64, example = json!(190))]
    pub sugar_level: Number,

    /// Whether the model requested an alert
    pub alert_triggered: bool,

    /// Model reply, or the SMS delivery outcome when an alert was sent
    pub message: String,
}

impl CheckSugarAlertResponse {
    pub fn from_decision(sugar_level: Number, decision: AlertDecision) -> Self {
        Self {
            status: CHECK_COMPLETE_STATUS.to_string(),
            sugar_level,
            alert_triggered: decision.triggered,
            message: decision.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CheckSugarAlertRequest {
        CheckSugarAlertRequest {
            current_sugar: Some(Number::from(190)),
            recipient_number: Some("+15551234567".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let (reading, sugar_level) = CheckSugarAlertRequest {
            user_target_max: Some(160.0),
            recent_activity: Some("Ran 5k".to_string()),
            ..valid()
        }
        .into_reading()
        .unwrap();

        assert_eq!(sugar_level, Number::from(190));
        assert_eq!(reading.current_sugar, 190.0);
        assert_eq!(reading.recipient_number, "+15551234567");
        assert_eq!(reading.user_target_max, Some(160.0));
        assert_eq!(reading.recent_activity, "Ran 5k");
        assert_eq!(reading.time_since_meal, "Data not integrated");
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let no_sugar = CheckSugarAlertRequest {
            current_sugar: None,
            ..valid()
        };
        let errors = no_sugar.into_reading().unwrap_err();
        assert!(errors.field_errors().contains_key("current_sugar"));

        let no_recipient = CheckSugarAlertRequest {
            recipient_number: None,
            ..valid()
        };
        let errors = no_recipient.into_reading().unwrap_err();
        assert!(errors.field_errors().contains_key("recipient_number"));
    }

    #[test]
    fn test_blank_recipient_is_rejected() {
        let blank = CheckSugarAlertRequest {
            recipient_number: Some("  ".to_string()),
            ..valid()
        };
        let errors = blank.into_reading().unwrap_err();
        assert!(errors.field_errors().contains_key("recipient_number"));
    }

    #[test]
    fn test_fractional_sugar_converts() {
        let (reading, sugar_level) = CheckSugarAlertRequest {
            current_sugar: Number::from_f64(182.5),
            ..valid()
        }
        .into_reading()
        .unwrap();

        assert_eq!(reading.current_sugar, 182.5);
        assert_eq!(sugar_level.as_f64(), Some(182.5));
    }

    #[test]
    fn test_response_echoes_integer_sugar_as_integer() {
        let response = CheckSugarAlertResponse::from_decision(
            Number::from(190),
            AlertDecision::no_alert("No alert needed."),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sugar_level"], serde_json::json!(190));
        assert!(json["sugar_level"].is_u64());
    }
}
