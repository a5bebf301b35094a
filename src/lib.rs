//! Milan Algo - moderation and matching core for the Milan community app
//!
//! This library implements the profile moderation workflow, report-driven
//! suspension, matrimonial compatibility scoring, photo verification against
//! an external face-detection service, and the swipe candidate queue.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    compatibility_score, Matcher, ModerationWorkflow, ReportingSubsystem, SwipeSession,
};
pub use models::{MatchFilters, ModerationStatus, Profile, ScoredCandidate};
pub use services::{
    MemoryStore, PhotoVerificationGateway, RetryPolicy, VerificationFailure, VerificationVerdict,
};
