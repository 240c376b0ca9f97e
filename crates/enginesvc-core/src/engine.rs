use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An engine record held by the registry.
///
/// `id` is required on the wire and must be globally unique. Every other
/// field falls back to its zero value when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Engine {
    #[schema(example = "e1")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "f1")]
    pub factory_id: String,
    /// Opaque configuration blob, stored as-is.
    #[serde(default)]
    pub engine_config: String,
    #[serde(default)]
    pub engine_capacity: f64,
    #[serde(default)]
    pub fuel_capacity: f64,
    #[serde(default)]
    pub fuel_range: f64,
    #[serde(default)]
    pub engine_hp: f64,
    #[serde(default)]
    pub engine_torque: f64,
}

impl Engine {
    pub fn new(id: impl Into<String>, factory_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            factory_id: factory_id.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.engine_config = config.into();
        self
    }
}
