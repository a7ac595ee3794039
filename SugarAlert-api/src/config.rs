//! Process configuration read from the environment

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

use sugar_alert_data::llm::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SCHEDULER_TICK_MS: u64 = 1000;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is absent or blank
    #[error("Critical configuration value {0} not found. Check your .env file.")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the server needs to start
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub sms_gateway_url: String,
    pub sms_api_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub scheduler_tick: Duration,
    pub environment: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("sms_gateway_url", &self.sms_gateway_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheduler_tick", &self.scheduler_tick)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from a map, mainly for tests
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        // All three keys are checked before anything else so the error names the first gap
        let gemini_api_key = required("GEMINI_API_KEY")?;
        let sms_gateway_url = required("SMS_GATEWAY_URL")?;
        let sms_api_key = required("SMS_API_KEY")?;

        let host = match optional("HOST") {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match optional("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let tick_ms = match optional("SCHEDULER_TICK_MS") {
            Some(value) => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SCHEDULER_TICK_MS",
                        value,
                    })
                }
            },
            None => DEFAULT_SCHEDULER_TICK_MS,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: optional("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: optional("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            sms_gateway_url,
            sms_api_key,
            host,
            port,
            scheduler_tick: Duration::from_millis(tick_ms),
            environment: optional("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Address the server listens on
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
