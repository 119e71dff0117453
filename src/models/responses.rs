use serde::{Deserialize, Serialize};

use crate::models::domain::{CharacterSummary, FilterStats, WhitelistStatus};

/// Response for the filter endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub status: WhitelistStatus,
    pub stats: FilterStats,
    #[serde(rename = "searchUrl")]
    pub search_url: String,
}

/// Character listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharactersResponse {
    pub characters: Vec<CharacterSummary>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub characters: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
