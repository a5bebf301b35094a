use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CommunityRequest, MatchRecord, ModerationStatus, Profile, Report, UserAccount};

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Abstract persistence for the moderation/matching core.
///
/// Production talks to the hosted document store over HTTP; tests inject an
/// in-memory implementation so fixtures never share a code path with
/// production queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, StoreError>;
    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;
    async fn list_approved_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Write status and admin notes in a single update.
    async fn update_profile_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError>;

    async fn get_request(&self, id: &str) -> Result<Option<CommunityRequest>, StoreError>;
    async fn update_request_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError>;

    async fn insert_report(&self, report: &Report) -> Result<(), StoreError>;

    /// Total reports ever filed against the user, all types, regardless of
    /// review status.
    async fn count_reports_against_user(&self, user_id: &str) -> Result<usize, StoreError>;

    /// Persist a match pairing. Idempotent per unordered profile pair;
    /// returns true when a new record was created.
    async fn upsert_match(&self, record: &MatchRecord) -> Result<bool, StoreError>;

    async fn get_user(&self, id: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Set the user's suspended flag. Setting it twice has no additional
    /// effect, which is what makes the reporting race tolerable.
    async fn set_user_suspended(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Blob storage for profile photos.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload raw bytes under a path; returns the stored object's id/url.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;
}
