use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health of a discovered instance as reported by the discovery backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Only passing instances take traffic when discovery filters on health.
    pub fn is_passing(self) -> bool {
        self == HealthStatus::Healthy
    }
}
