// SugarAlert-api lib.rs
//
// HTTP surface for SugarAlert: routing, request and response entities,
// configuration and API documentation.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
