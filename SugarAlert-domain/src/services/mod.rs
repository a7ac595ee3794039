pub mod reminder;
pub mod sugar_check;

// Domain services
// This module contains business logic implementations.

// Re-export services and their error types
pub use reminder::{ReminderError, ReminderService};
pub use sugar_check::{SugarCheckError, SugarCheckService};
