use serde::{Deserialize, Serialize};

use crate::core::session::{DiscoveryView, SearchOutcome};

/// Session snapshot returned by the session endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: uuid::Uuid,
    pub view: DiscoveryView,
}

/// Result of a search submitted to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub session_id: uuid::Uuid,
    pub outcome: SearchOutcome,
    pub view: DiscoveryView,
}

/// Result of the one-shot listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    pub outcome: Option<SearchOutcome>,
    pub view: DiscoveryView,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub florists: usize,
    pub sessions: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
