use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{
    FamilyInfo, Gender, MatchFilters, ModeratedKind, ModerationDecision, PartnerPreferences,
    ReportTarget, ReportType,
};

/// Request to submit a new matrimonial profile.
///
/// Photos are base64-encoded image bytes; at least the first one must pass
/// face verification before the profile is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitProfileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom(function = "validate_adult"))]
    #[serde(alias = "date_of_birth", rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(rename = "presentAddress", default)]
    pub present_address: String,
    #[serde(rename = "nativePlace", default)]
    pub native_place: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub occupation: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub family: FamilyInfo,
    #[serde(default)]
    pub preferences: PartnerPreferences,
    #[validate(length(min = 1, max = 5))]
    pub photos: Vec<String>,
}

/// Profile owners must be at least 18 years old.
fn validate_adult(date_of_birth: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    if years < 18 {
        return Err(ValidationError::new("underage"));
    }
    Ok(())
}

/// Standalone photo verification request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyPhotoRequest {
    #[validate(length(min = 1))]
    pub image: String,
}

/// Admin moderation request for a pending profile or community request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModerateRequest {
    pub kind: ModeratedKind,
    #[validate(length(min = 1))]
    #[serde(alias = "entity_id", rename = "entityId")]
    pub entity_id: String,
    pub decision: ModerationDecision,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to file a report. Exactly one of the four target ids must be set;
/// the handler converts this wire shape into the closed `ReportTarget` enum.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileReportRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "reporter_id", rename = "reporterId")]
    pub reporter_id: String,
    #[serde(rename = "reportedUserId", default)]
    pub reported_user_id: Option<String>,
    #[serde(rename = "reportedPostId", default)]
    pub reported_post_id: Option<String>,
    #[serde(rename = "reportedRequestId", default)]
    pub reported_request_id: Option<String>,
    #[serde(rename = "reportedProfileId", default)]
    pub reported_profile_id: Option<String>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[serde(default)]
    pub description: Option<String>,
}

impl FileReportRequest {
    /// Collapse the four optional wire fields into the single-target enum.
    pub fn target(&self) -> Result<ReportTarget, &'static str> {
        let mut targets = Vec::new();
        if let Some(id) = &self.reported_user_id {
            targets.push(ReportTarget::User(id.clone()));
        }
        if let Some(id) = &self.reported_post_id {
            targets.push(ReportTarget::Post(id.clone()));
        }
        if let Some(id) = &self.reported_request_id {
            targets.push(ReportTarget::Request(id.clone()));
        }
        if let Some(id) = &self.reported_profile_id {
            targets.push(ReportTarget::Profile(id.clone()));
        }
        match targets.len() {
            0 => Err("a report must name a target"),
            1 => Ok(targets.remove(0)),
            _ => Err("a report must name exactly one target"),
        }
    }
}

/// Request to compute matches for a profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: String,
    #[serde(rename = "minScore", default)]
    pub min_score: Option<u8>,
}

/// Request to replace a user's swipe filters and rebuild the queue.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetFiltersRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub filters: MatchFilters,
}

/// Request for a swipe action (like/pass) on the caller's current candidate.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
