// Public entities for the SugarAlert API
// This module contains data structures that cross the HTTP boundary

// Glucose reading check requests and responses
pub mod sugar_alert;

// Medication reminder requests and responses
pub mod reminder;

// Common entities for error handling
pub mod common;
