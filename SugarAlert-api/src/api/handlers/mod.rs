pub mod health;
pub mod reminder;
pub mod sugar_alert;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use health::health_check;
pub use reminder::schedule_reminder;
pub use sugar_alert::check_sugar_alert;
