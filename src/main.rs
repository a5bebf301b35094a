mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::{Matcher, ModerationWorkflow, ReportingSubsystem};
use crate::routes::api::AppState;
use crate::services::{
    AppwriteCollections, AppwriteStore, BlobStore, DocumentStore, PhotoVerificationGateway,
    RetryPolicy,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Milan Algo moderation/matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the Appwrite-backed document store
    let collections = AppwriteCollections {
        profiles: settings.collection.profiles,
        requests: settings.collection.requests,
        reports: settings.collection.reports,
        matches: settings.collection.matches,
        users: settings.collection.users,
        photo_bucket: settings.collection.photo_bucket,
    };

    let appwrite = Arc::new(
        AppwriteStore::new(
            settings.appwrite.endpoint,
            settings.appwrite.api_key,
            settings.appwrite.project_id,
            settings.appwrite.database_id,
            collections,
        )
        .unwrap_or_else(|e| {
            error!("Failed to initialize Appwrite store: {}", e);
            panic!("Appwrite store error: {}", e);
        }),
    );

    let store: Arc<dyn DocumentStore> = appwrite.clone();
    let blobs: Arc<dyn BlobStore> = appwrite;

    info!("Appwrite store initialized");

    // Initialize the photo verification gateway. A missing detector token is
    // a configuration error caught here, before any call is attempted.
    let policy = RetryPolicy {
        max_attempts: 2,
        retry_delay: Duration::from_secs(settings.detector.retry_delay_secs),
        initial_timeout: Duration::from_secs(settings.detector.initial_timeout_secs),
        retry_timeout: Duration::from_secs(settings.detector.retry_timeout_secs),
    };

    let gateway = Arc::new(
        PhotoVerificationGateway::new(settings.detector.endpoint, settings.detector.token, policy)
            .unwrap_or_else(|e| {
                error!("Failed to initialize verification gateway: {}", e);
                panic!("Verification gateway error: {}", e);
            }),
    );

    info!("Photo verification gateway initialized");

    let matcher = Matcher::new(settings.matching.min_score);
    let moderation = ModerationWorkflow::new(store.clone());
    let reporting = ReportingSubsystem::new(store.clone(), settings.moderation.suspension_threshold);

    info!(
        "Matcher initialized (min score {}), suspension threshold {}",
        settings.matching.min_score, settings.moderation.suspension_threshold
    );

    // Build application state
    let app_state = AppState {
        store,
        blobs,
        gateway,
        matcher,
        moderation,
        reporting,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        admin_key: settings.moderation.admin_key,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
