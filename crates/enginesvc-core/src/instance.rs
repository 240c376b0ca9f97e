use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::health::HealthStatus;

/// One server process as listed by the discovery backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceInstance {
    pub id: Uuid,
    pub service_name: String,
    /// `host:port`, optionally prefixed with a scheme.
    pub address: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub health: HealthStatus,
}

impl ServiceInstance {
    pub fn new(service_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_name: service_name.into(),
            address: address.into(),
            tags: Vec::new(),
            metadata: HashMap::new(),
            health: HealthStatus::Unknown,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn set_health(&mut self, health: HealthStatus) {
        self.health = health;
    }

    /// Tags of this instance. Registries without a tag field (LogPose) carry
    /// them as a comma-separated `tags` metadata entry.
    pub fn tag_list(&self) -> Vec<&str> {
        if !self.tags.is_empty() {
            return self.tags.iter().map(String::as_str).collect();
        }
        self.metadata
            .get("tags")
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_tags(&self, required: &[String]) -> bool {
        let tags = self.tag_list();
        required.iter().all(|tag| tags.contains(&tag.as_str()))
    }

    /// Whether this instance satisfies a tag filter and, optionally, a
    /// passing-health filter.
    pub fn matches(&self, tags: &[String], passing_only: bool) -> bool {
        self.has_tags(tags) && (!passing_only || self.health.is_passing())
    }
}
