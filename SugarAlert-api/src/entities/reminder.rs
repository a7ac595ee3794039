use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::common::field_error;
use sugar_alert_domain::entities::{ReminderJob, ReminderRequest};

pub const MISSING_SCHEDULING_FIELDS: &str = "Missing required scheduling data.";
pub const REMINDER_SCHEDULED_STATUS: &str = "Reminder scheduled successfully";

/// Request payload for scheduling a medication reminder
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScheduleReminderRequest {
    /// Mobile number the reminder is sent to
    #[validate(required(message = "recipient_number is required"))]
    pub recipient_number: Option<String>,

    /// Name of the medication
    pub medication_name: Option<String>,

    /// Dose to take, e.g. "500mg"
    pub dosage: Option<String>,

    /// Time of day in 24-hour HH:MM form
    #[validate(required(message = "scheduled_time is required"))]
    #[schema(example = "08:00")]
    pub scheduled_time: Option<String>,
}

impl ScheduleReminderRequest {
    /// Validate the payload and convert it into a domain request
    pub fn into_domain(self) -> Result<ReminderRequest, ValidationErrors> {
        self.validate()?;

        let recipient_number = self
            .recipient_number
            .filter(|number| !number.trim().is_empty())
            .ok_or_else(|| field_error("recipient_number", "blank"))?;
        let scheduled_time = self
            .scheduled_time
            .filter(|time| !time.trim().is_empty())
            .ok_or_else(|| field_error("scheduled_time", "blank"))?;

        Ok(ReminderRequest {
            recipient_number,
            medication_name: self.medication_name.unwrap_or_default(),
            dosage: self.dosage.unwrap_or_default(),
            scheduled_time,
        })
    }
}

/// Confirmation of a scheduled reminder
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleReminderResponse {
    /// Always "Reminder scheduled successfully"
    pub status: String,

    /// Medication the reminder is for
    pub medication: String,

    /// ISO-8601 timestamp the reminder will be sent at
    #[schema(example = "2025-11-27T08:00:00+00:00")]
    pub scheduled_for: String,
}

impl From<ReminderJob> for ScheduleReminderResponse {
    fn from(job: ReminderJob) -> Self {
        Self {
            status: REMINDER_SCHEDULED_STATUS.to_string(),
            medication: job.medication_name,
            scheduled_for: job.run_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}
