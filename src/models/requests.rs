use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::filters::Facet;

/// Request to run a location search in a session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 256))]
    pub query: String,
}

/// Request to create a discovery session, optionally seeded with a query
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(max = 256))]
    #[serde(default)]
    pub query: Option<String>,
}

/// Facet toggle event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleFilterRequest {
    pub facet: Facet,
    #[validate(length(min = 1, max = 64))]
    pub value: String,
}

/// Query string of the one-shot listing endpoint
///
/// Facet selections are comma separated, e.g. `?q=London&price=$,$$`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub categories: Option<String>,
}

impl DiscoveryQuery {
    /// Split a comma separated facet parameter into trimmed, non-empty values
    pub fn values(param: &Option<String>) -> Vec<String> {
        param
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
