// SugarAlert Data
// This crate handles interactions with external services

// SMS gateway used to deliver alerts and reminders
pub mod sms;

// Hosted language model that decides whether an alert is warranted
pub mod llm;
