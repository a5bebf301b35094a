use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Profile gender. The matrimonial flow is strictly opposite-gender, so this
/// stays a closed two-value enum rather than a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Moderation status shared by profiles and community requests.
///
/// `Approved` and `Rejected` are terminal; the only legal transitions are
/// `Pending -> Approved` and `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

/// Outcome an admin can apply to a pending entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

impl From<ModerationDecision> for ModerationStatus {
    fn from(value: ModerationDecision) -> Self {
        match value {
            ModerationDecision::Approved => ModerationStatus::Approved,
            ModerationDecision::Rejected => ModerationStatus::Rejected,
        }
    }
}

/// Which moderated collection an entity id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeratedKind {
    Profile,
    Request,
}

/// Stated partner preferences on a profile. An absent age bound means the
/// owner stated no range; scoring skips that criterion instead of guessing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerPreferences {
    #[serde(rename = "minAge", default)]
    pub min_age: Option<u8>,
    #[serde(rename = "maxAge", default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub expectations: Option<String>,
}

impl PartnerPreferences {
    /// Both bounds stated, as an inclusive range.
    pub fn age_range(&self) -> Option<(u8, u8)> {
        Some((self.min_age?, self.max_age?))
    }
}

/// Family details shown on the matrimonial listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyInfo {
    #[serde(rename = "fatherName", default)]
    pub father_name: Option<String>,
    #[serde(rename = "motherName", default)]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub siblings: Option<u8>,
}

/// A user's matrimonial listing. At most one per user; created only after at
/// least one photo passed verification, and invisible to matching until an
/// admin approves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
    pub city: String,
    #[serde(rename = "presentAddress", default)]
    pub present_address: String,
    #[serde(rename = "nativePlace", default)]
    pub native_place: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub family: FamilyInfo,
    #[serde(default)]
    pub preferences: PartnerPreferences,
    #[serde(rename = "photoIds", default)]
    pub photo_ids: Vec<String>,
    pub status: ModerationStatus,
    #[serde(rename = "adminNotes", default)]
    pub admin_notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
}

impl Profile {
    /// Age in completed years, when a date of birth is on record.
    pub fn age(&self) -> Option<u8> {
        let dob = self.date_of_birth?;
        let today = Utc::now().date_naive();
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u8::try_from(years).ok()
    }

    pub fn approved(&self) -> bool {
        self.status == ModerationStatus::Approved
    }
}

/// Kind of community request posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Celebration,
    Condolence,
    #[serde(rename = "matchpost")]
    MatchPost,
}

/// A community posting (celebration, condolence, match post) that goes
/// through the same pending/approved/rejected workflow as profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityRequest {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub kind: RequestKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub status: ModerationStatus,
    #[serde(rename = "adminNotes", default)]
    pub admin_notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
}

/// Category a reporter assigns to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Fake,
    Harassment,
    Inappropriate,
    Spam,
    Other,
}

/// Review status of a filed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

/// The single subject of a report. Modelled as an enum so a report cannot
/// point at two targets (or none) at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportTarget {
    User(String),
    Post(String),
    Request(String),
    Profile(String),
}

impl ReportTarget {
    /// The reported user id, when the report targets a user directly.
    /// Only these reports count toward suspension.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            ReportTarget::User(id) => Some(id),
            _ => None,
        }
    }
}

/// A filed report. Append-only from the reporter's perspective; only admins
/// move its status forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(rename = "reporterId")]
    pub reporter_id: String,
    pub target: ReportTarget,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ReportStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
}

/// Lifecycle of a persisted match pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A persisted pairing of two profiles with its computed score. Created only
/// by the matching engine, never edited by users directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    #[serde(rename = "profileId1")]
    pub profile_id_1: String,
    #[serde(rename = "profileId2")]
    pub profile_id_2: String,
    pub score: u8,
    pub status: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
}

/// Account-level record. Suspension is one-way: once reports against a user
/// reach the threshold the flag is set and nothing in this core clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub suspended: bool,
}

/// Gender constraint in swipe filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilter {
    #[default]
    All,
    Male,
    Female,
}

impl GenderFilter {
    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Male => gender == Gender::Male,
            GenderFilter::Female => gender == Gender::Female,
        }
    }
}

/// Transient swipe-queue filters; not persisted per match.
///
/// `location_radius_km` is collected from the client but carried as
/// informational only; the queue filter does substring matching on address
/// fields, not geospatial distance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchFilters {
    #[serde(rename = "ageMin", default)]
    pub age_min: Option<u8>,
    #[serde(rename = "ageMax", default)]
    pub age_max: Option<u8>,
    #[serde(rename = "locationQuery", default)]
    pub location_query: Option<String>,
    #[serde(rename = "locationRadiusKm", default)]
    pub location_radius_km: Option<u16>,
    #[serde(default)]
    pub gender: GenderFilter,
}

/// One entry of the matching engine's output: a candidate profile id, the
/// computed score, and the criteria that contributed to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub score: u8,
    #[serde(default)]
    pub reasons: Vec<String>,
}
