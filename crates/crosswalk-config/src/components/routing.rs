//! Routing configuration

use serde::{Deserialize, Serialize};

/// Resource path override for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRouteConfig {
    pub name: String,
    pub path: String,
}

/// Routing rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// System of record for entity creation (`ACADEMIC` or `LIBRARY`)
    pub authoritative_source: String,
    /// Resource path overrides, applied on top of the built-in table
    pub entities: Vec<EntityRouteConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            authoritative_source: "ACADEMIC".to_string(),
            entities: Vec::new(),
        }
    }
}
