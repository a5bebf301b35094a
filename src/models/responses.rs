use serde::{Deserialize, Serialize};

use crate::models::domain::{ModerationStatus, Profile, ScoredCandidate};

/// Response after a profile submission was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitProfileResponse {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub status: ModerationStatus,
}

/// Response for the find matches endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<ScoredCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response after a moderation decision was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateResponse {
    pub success: bool,
    pub status: ModerationStatus,
}

/// Response after filing a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReportResponse {
    #[serde(rename = "reportId")]
    pub report_id: String,
}

/// Current position in a swipe session. `candidate` is None once the queue
/// is exhausted; that is a terminal state, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateResponse {
    pub candidate: Option<Profile>,
    pub position: usize,
    pub remaining: usize,
    pub exhausted: bool,
}

/// Response after a like: how many match records the engine produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    #[serde(rename = "matchesRecorded")]
    pub matches_recorded: usize,
    pub session: SessionStateResponse,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
