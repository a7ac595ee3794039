//! Domain layer health check functionality
//! This module provides health check services for the application

use async_trait::async_trait;
use std::collections::HashMap;

use crate::scheduler::JobScheduler;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Derive the overall status from the worst component
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the job scheduler
    /// Returns the number of pending jobs while it is running
    /// Returns an error once it has been stopped
    async fn check_scheduler_status(&self) -> Result<usize, String>;
}

/// Health service reporting on the API and the job scheduler
#[derive(Debug, Clone)]
pub struct HealthService {
    scheduler: JobScheduler,
}

impl HealthService {
    pub fn new(scheduler: JobScheduler) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        let scheduler = match self.check_scheduler_status().await {
            Ok(pending) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!("{} pending job(s)", pending)),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };
        components.insert("scheduler".to_string(), scheduler);

        // The API answering at all means it is up
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_scheduler_status(&self) -> Result<usize, String> {
        if self.scheduler.is_running() {
            Ok(self.scheduler.pending_jobs())
        } else {
            Err("Job scheduler is not running".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{SchedulerConfig, SystemClock};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_running_scheduler_is_healthy() {
        let scheduler = JobScheduler::start(Arc::new(SystemClock), SchedulerConfig::default());
        let service = HealthService::new(scheduler);

        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        let component = health.components.get("scheduler").expect("Scheduler component should exist");
        assert_eq!(component.details.as_deref(), Some("0 pending job(s)"));
        assert!(health.components.contains_key("api"));
    }

    #[tokio::test]
    async fn test_stopped_scheduler_is_unhealthy() {
        let scheduler = JobScheduler::start(Arc::new(SystemClock), SchedulerConfig::default());
        scheduler.stop().await.unwrap();
        let service = HealthService::new(scheduler);

        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert!(service.check_scheduler_status().await.is_err());
    }

    #[test]
    fn test_degraded_component_degrades_system() {
        let mut components = HashMap::new();
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );
        components.insert(
            "sms".to_string(),
            HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Slow responses".to_string()),
            },
        );

        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Degraded);
    }
}
