// SugarAlert Domain
// This crate contains the business logic for the SugarAlert application

// Services that implement the sugar-check and reminder flows
pub mod services;

// One-shot job scheduling
pub mod scheduler;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the service clients from sugar_alert_data for convenience
pub use sugar_alert_data::{llm, sms};

// Testing utilities - only available in tests or with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
