use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::entities::{ReminderJob, ReminderRequest};
use crate::scheduler::{JobScheduler, SchedulerError};
use sugar_alert_data::sms::AlertDispatcher;

/// Reminder scheduling errors
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The time of day was not in 24-hour `HH:MM` form
    #[error("time data '{0}' does not match format 'HH:MM'")]
    InvalidTime(String),

    /// The scheduler refused the job
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Parse a 24-hour `HH:MM` time of day
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ReminderError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ReminderError::InvalidTime(value.to_string()))
}

/// Next instant, strictly after `now`, at which the wall clock reads `time`
///
/// Today's date is tried first. When the wall time occurs twice today the first
/// occurrence after `now` wins; if none is in the future the same time tomorrow
/// is used.
pub fn resolve_next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let same_day = now.date_naive().and_time(time);
    local_instants(&tz, same_day)
        .into_iter()
        .find(|candidate| candidate > now)
        .unwrap_or_else(|| localize(&tz, same_day + Duration::days(1)))
}

// Every instant the wall clock reads `naive`, in order
fn local_instants<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Vec<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => vec![dt],
        LocalResult::Ambiguous(earliest, latest) => vec![earliest, latest],
        LocalResult::None => vec![localize(tz, naive)],
    }
}

// Ambiguous local times take the earlier instant; skipped ones move past the gap
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Text sent when a medication reminder fires
pub fn reminder_message(medication_name: &str, dosage: &str) -> String {
    format!(
        "💊 MEDICATION REMINDER: It's time! Take {} of {} now. Stay consistent!",
        dosage, medication_name
    )
}

/// Turns reminder requests into scheduled SMS jobs
pub struct ReminderService {
    scheduler: JobScheduler,
    dispatcher: Arc<dyn AlertDispatcher>,
}

impl ReminderService {
    pub fn new(scheduler: JobScheduler, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        Self { scheduler, dispatcher }
    }

    /// Resolve the run time and hand the reminder to the scheduler
    #[instrument(skip_all, fields(medication = %request.medication_name))]
    pub fn schedule(&self, request: ReminderRequest) -> Result<ReminderJob, ReminderError> {
        let time = parse_time_of_day(&request.scheduled_time)?;
        let run_at = resolve_next_occurrence(&self.scheduler.now(), time);
        let message = reminder_message(&request.medication_name, &request.dosage);

        let dispatcher = Arc::clone(&self.dispatcher);
        let recipient = request.recipient_number.clone();
        let body = message.clone();
        let id = self.scheduler.schedule_at(run_at, move || async move {
            let result = dispatcher.send_alert(&recipient, &body).await;
            if result.delivered {
                info!("Medication reminder delivered: {}", result.detail);
            } else {
                warn!("Medication reminder failed: {}", result.detail);
            }
        })?;

        info!(job_id = %id, "Medication reminder scheduled for {}", run_at.format("%Y-%m-%d %H:%M:%S"));

        Ok(ReminderJob {
            id,
            recipient_number: request.recipient_number,
            medication_name: request.medication_name,
            dosage: request.dosage,
            message,
            run_at,
        })
    }
}
