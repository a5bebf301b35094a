// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod moderation;
pub mod reporting;
pub mod scoring;
pub mod session;

pub use filters::{build_queue, passes_filters};
pub use matcher::{MatchOutcome, Matcher, DEFAULT_MIN_SCORE};
pub use moderation::{ModerationError, ModerationWorkflow};
pub use reporting::{ReportError, ReportingSubsystem, DEFAULT_SUSPENSION_THRESHOLD};
pub use scoring::compatibility_score;
pub use session::SwipeSession;
