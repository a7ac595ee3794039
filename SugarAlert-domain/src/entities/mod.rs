// Domain entities and value objects
pub mod glucose;
pub mod reminder;

// Re-export common types for easier imports
pub use glucose::{AlertDecision, Reading, CONTEXT_NOT_INTEGRATED};
pub use reminder::{ReminderJob, ReminderRequest};
