use actix_web::{web, HttpRequest, HttpResponse, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::core::{Matcher, ModerationError, ModerationWorkflow, ReportingSubsystem, SwipeSession};
use crate::models::{
    ErrorResponse, FileReportRequest, FileReportResponse, FindMatchesRequest, FindMatchesResponse,
    HealthResponse, LikeResponse, MatchFilters, MatchRecord, MatchStatus, ModerateRequest,
    ModerateResponse, ModerationStatus, Profile, SessionStateResponse, SetFiltersRequest,
    SubmitProfileRequest, SubmitProfileResponse, SwipeRequest, VerifyPhotoRequest,
};
use crate::services::{BlobStore, DocumentStore, PhotoVerificationGateway};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub gateway: Arc<PhotoVerificationGateway>,
    pub matcher: Matcher,
    pub moderation: ModerationWorkflow,
    pub reporting: ReportingSubsystem,
    pub sessions: Arc<RwLock<HashMap<String, SwipeSession>>>,
    pub admin_key: String,
}

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/profiles/submit", web::post().to(submit_profile))
        .route("/photos/verify", web::post().to(verify_photo))
        .route("/moderation/decide", web::post().to(moderate))
        .route("/reports", web::post().to(file_report))
        .route("/matches/find", web::post().to(find_matches))
        .route("/session/filters", web::post().to(set_filters))
        .route("/session/next", web::get().to(session_next))
        .route("/session/like", web::post().to(session_like))
        .route("/session/pass", web::post().to(session_pass));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn internal_error(error: &str, message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 500,
    })
}

fn session_state(session: &SwipeSession) -> SessionStateResponse {
    SessionStateResponse {
        candidate: session.current().cloned(),
        position: session.position(),
        remaining: session.remaining(),
        exhausted: session.exhausted(),
    }
}

/// Submit a new matrimonial profile
///
/// POST /api/v1/profiles/submit
///
/// The first photo must pass face verification before anything is persisted;
/// a user may hold at most one profile.
async fn submit_profile(
    state: web::Data<AppState>,
    req: web::Json<SubmitProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submit_profile: {:?}", errors);
        return bad_request("validation_failed", errors.to_string());
    }

    match state.store.get_profile_by_user(&req.user_id).await {
        Ok(Some(existing)) => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "profile_exists".to_string(),
                message: format!("user already has profile {}", existing.id),
                status_code: 409,
            });
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to check existing profile for {}: {}", req.user_id, e);
            return internal_error("store_error", e.to_string());
        }
    }

    let mut photo_bytes = Vec::with_capacity(req.photos.len());
    for photo in &req.photos {
        match BASE64.decode(photo) {
            Ok(bytes) => photo_bytes.push(bytes),
            Err(e) => return bad_request("invalid_photo", format!("photo is not valid base64: {}", e)),
        }
    }

    // Gate on the first photo: the profile is only created once a photo has
    // a single confident face in it.
    let verdict = state.gateway.verify(&photo_bytes[0]).await;
    if let Some(failure) = verdict.error {
        tracing::info!(
            "Profile submission for {} rejected by verification: {:?}",
            req.user_id,
            failure
        );
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": "photo_rejected",
            "verdict": verdict,
            "statusCode": 422,
        }));
    }

    let profile_id = uuid::Uuid::new_v4().to_string();
    let mut photo_ids = Vec::with_capacity(photo_bytes.len());
    for (index, bytes) in photo_bytes.iter().enumerate() {
        let path = format!("profiles/{}/photo_{}.jpg", profile_id, index);
        match state.blobs.upload(&path, bytes).await {
            Ok(id) => photo_ids.push(id),
            Err(e) => {
                tracing::error!("Photo upload failed for {}: {}", req.user_id, e);
                return internal_error("upload_failed", e.to_string());
            }
        }
    }

    let req = req.into_inner();
    let profile = Profile {
        id: profile_id.clone(),
        user_id: req.user_id,
        name: req.name,
        date_of_birth: Some(req.date_of_birth),
        gender: req.gender,
        height_cm: req.height_cm,
        city: req.city,
        present_address: req.present_address,
        native_place: req.native_place,
        education: req.education,
        occupation: req.occupation,
        email: req.email,
        phone: req.phone,
        family: req.family,
        preferences: req.preferences,
        photo_ids,
        status: ModerationStatus::Pending,
        admin_notes: None,
        created_at: chrono::Utc::now(),
    };

    if let Err(e) = state.store.insert_profile(&profile).await {
        tracing::error!("Failed to persist profile {}: {}", profile.id, e);
        return internal_error("store_error", e.to_string());
    }

    tracing::info!("Profile {} submitted for user {}", profile.id, profile.user_id);

    HttpResponse::Ok().json(SubmitProfileResponse {
        profile_id,
        status: ModerationStatus::Pending,
    })
}

/// Verify a single photo without creating anything
///
/// POST /api/v1/photos/verify
///
/// Always answers 200 with a structured verdict; rejection reasons are in
/// the verdict's error category, not the HTTP status.
async fn verify_photo(
    state: web::Data<AppState>,
    req: web::Json<VerifyPhotoRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let bytes = match BASE64.decode(&req.image) {
        Ok(bytes) => bytes,
        Err(e) => return bad_request("invalid_photo", format!("image is not valid base64: {}", e)),
    };

    let verdict = state.gateway.verify(&bytes).await;
    HttpResponse::Ok().json(verdict)
}

/// Apply an admin moderation decision
///
/// POST /api/v1/moderation/decide (requires X-Admin-Key)
async fn moderate(
    state: web::Data<AppState>,
    req: web::Json<ModerateRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let provided = http_req
        .headers()
        .get("X-Admin-Key")
        .and_then(|v| v.to_str().ok());
    if provided != Some(state.admin_key.as_str()) {
        return HttpResponse::Forbidden().json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "moderation requires an admin key".to_string(),
            status_code: 403,
        });
    }

    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    match state
        .moderation
        .moderate(req.kind, &req.entity_id, req.decision, req.notes.clone())
        .await
    {
        Ok(status) => HttpResponse::Ok().json(ModerateResponse {
            success: true,
            status,
        }),
        Err(e @ ModerationError::NotFound { .. }) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: e.to_string(),
            status_code: 404,
        }),
        Err(e @ ModerationError::InvalidTransition { .. }) => {
            HttpResponse::Conflict().json(ErrorResponse {
                error: "invalid_transition".to_string(),
                message: e.to_string(),
                status_code: 409,
            })
        }
        Err(ModerationError::Store(e)) => {
            tracing::error!("Moderation store failure: {}", e);
            internal_error("store_error", e.to_string())
        }
    }
}

/// File a report
///
/// POST /api/v1/reports
async fn file_report(
    state: web::Data<AppState>,
    req: web::Json<FileReportRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let target = match req.target() {
        Ok(target) => target,
        Err(msg) => return bad_request("invalid_target", msg.to_string()),
    };

    match state
        .reporting
        .file_report(&req.reporter_id, target, req.report_type, req.description.clone())
        .await
    {
        Ok(report) => HttpResponse::Ok().json(FileReportResponse { report_id: report.id }),
        Err(e) => {
            tracing::error!("Failed to file report from {}: {}", req.reporter_id, e);
            internal_error("report_failed", e.to_string())
        }
    }
}

/// Compute matches for a profile
///
/// POST /api/v1/matches/find
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let profile = match state.store.get_profile(&req.profile_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: format!("profile {} not found", req.profile_id),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile {}: {}", req.profile_id, e);
            return internal_error("store_error", e.to_string());
        }
    };

    let candidates = match state.store.list_approved_profiles().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to list candidates: {}", e);
            return internal_error("store_error", e.to_string());
        }
    };

    let matcher = match req.min_score {
        Some(min) => Matcher::new(min),
        None => state.matcher,
    };
    let outcome = matcher.find_matches(&profile, &candidates);

    tracing::info!(
        "Returning {} matches for profile {} (from {} candidates)",
        outcome.matches.len(),
        req.profile_id,
        outcome.total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        matches: outcome.matches,
        total_candidates: outcome.total_candidates,
    })
}

async fn viewer_and_candidates(
    state: &AppState,
    user_id: &str,
) -> Result<(Profile, Vec<Profile>), HttpResponse> {
    let viewer = match state.store.get_profile_by_user(user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: format!("no profile for user {}", user_id),
                status_code: 404,
            }));
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return Err(internal_error("store_error", e.to_string()));
        }
    };

    let candidates = match state.store.list_approved_profiles().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to list candidates: {}", e);
            return Err(internal_error("store_error", e.to_string()));
        }
    };

    Ok((viewer, candidates))
}

/// Replace swipe filters and rebuild the queue
///
/// POST /api/v1/session/filters
async fn set_filters(
    state: web::Data<AppState>,
    req: web::Json<SetFiltersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let (viewer, candidates) = match viewer_and_candidates(&state, &req.user_id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .entry(req.user_id.clone())
        .or_insert_with(|| SwipeSession::new(&viewer, &candidates, MatchFilters::default()));
    session.set_filters(&viewer, &candidates, req.filters.clone());

    tracing::debug!(
        "Rebuilt swipe queue for {}: {} candidates",
        req.user_id,
        session.remaining()
    );

    HttpResponse::Ok().json(session_state(session))
}

/// Current swipe candidate
///
/// GET /api/v1/session/next?userId={userId}
async fn session_next(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let user_id = match query.get("userId") {
        Some(id) => id.clone(),
        None => return bad_request("missing_parameter", "userId query parameter is required".to_string()),
    };

    {
        let sessions = state.sessions.read().await;
        if let Some(session) = sessions.get(&user_id) {
            return HttpResponse::Ok().json(session_state(session));
        }
    }

    // No session yet: start one with default (empty) filters.
    let (viewer, candidates) = match viewer_and_candidates(&state, &user_id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .entry(user_id)
        .or_insert_with(|| SwipeSession::new(&viewer, &candidates, MatchFilters::default()));

    HttpResponse::Ok().json(session_state(session))
}

/// Like the current candidate
///
/// POST /api/v1/session/like
///
/// Recomputes the viewer's entire match set against all approved profiles
/// and persists a match record per result, then advances the queue.
async fn session_like(
    state: web::Data<AppState>,
    req: web::Json<SwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let (viewer, candidates) = match viewer_and_candidates(&state, &req.user_id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let mut sessions = state.sessions.write().await;
    let session = match sessions.get_mut(&req.user_id) {
        Some(session) => session,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "no_session".to_string(),
                message: "no active swipe session; set filters first".to_string(),
                status_code: 404,
            });
        }
    };

    if session.exhausted() {
        return HttpResponse::Ok().json(LikeResponse {
            matches_recorded: 0,
            session: session_state(session),
        });
    }

    let outcome = state.matcher.find_matches(&viewer, &candidates);
    let mut recorded = 0;
    for candidate in &outcome.matches {
        let record = MatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id_1: viewer.id.clone(),
            profile_id_2: candidate.profile_id.clone(),
            score: candidate.score,
            status: MatchStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        match state.store.upsert_match(&record).await {
            Ok(true) => recorded += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to persist match for {}: {}", viewer.id, e);
                return internal_error("store_error", e.to_string());
            }
        }
    }

    session.advance();

    tracing::info!(
        "Like by {}: {} matches computed, {} newly recorded",
        req.user_id,
        outcome.matches.len(),
        recorded
    );

    HttpResponse::Ok().json(LikeResponse {
        matches_recorded: recorded,
        session: session_state(session),
    })
}

/// Pass on the current candidate
///
/// POST /api/v1/session/pass
async fn session_pass(
    state: web::Data<AppState>,
    req: web::Json<SwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let mut sessions = state.sessions.write().await;
    let session = match sessions.get_mut(&req.user_id) {
        Some(session) => session,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "no_session".to_string(),
                message: "no active swipe session; set filters first".to_string(),
                status_code: 404,
            });
        }
    };

    session.pass();
    HttpResponse::Ok().json(session_state(session))
}
