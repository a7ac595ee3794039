use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to remind a patient about a medication at a time of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub recipient_number: String,
    pub medication_name: String,
    pub dosage: String,
    /// Wall-clock time in 24-hour `HH:MM` form
    pub scheduled_time: String,
}

/// A reminder handed to the scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderJob {
    /// Identifier assigned by the scheduler
    pub id: Uuid,
    pub recipient_number: String,
    pub medication_name: String,
    pub dosage: String,
    /// Text that will be sent
    pub message: String,
    /// Absolute time the reminder fires; always in the future when created
    pub run_at: DateTime<Local>,
}
