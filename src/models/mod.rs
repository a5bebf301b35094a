// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CommunityRequest, FamilyInfo, Gender, GenderFilter, MatchFilters, MatchRecord, MatchStatus,
    ModeratedKind, ModerationDecision, ModerationStatus, PartnerPreferences, Profile, Report,
    ReportStatus, ReportTarget, ReportType, RequestKind, ScoredCandidate, UserAccount,
};
pub use requests::{
    FileReportRequest, FindMatchesRequest, ModerateRequest, SetFiltersRequest,
    SubmitProfileRequest, SwipeRequest, VerifyPhotoRequest,
};
pub use responses::{
    ErrorResponse, FileReportResponse, FindMatchesResponse, HealthResponse, LikeResponse,
    ModerateResponse, SessionStateResponse, SubmitProfileResponse,
};
