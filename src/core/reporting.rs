use std::sync::Arc;

use thiserror::Error;

use crate::models::{Report, ReportStatus, ReportTarget, ReportType};
use crate::services::store::{DocumentStore, StoreError};

/// Default number of reports against a user that triggers suspension.
pub const DEFAULT_SUSPENSION_THRESHOLD: usize = 5;

/// Errors from report intake.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Report intake plus threshold-triggered user suspension.
#[derive(Clone)]
pub struct ReportingSubsystem {
    store: Arc<dyn DocumentStore>,
    suspension_threshold: usize,
}

impl ReportingSubsystem {
    pub fn new(store: Arc<dyn DocumentStore>, suspension_threshold: usize) -> Self {
        Self {
            store,
            suspension_threshold,
        }
    }

    pub fn with_default_threshold(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, DEFAULT_SUSPENSION_THRESHOLD)
    }

    /// File a report. Intake never rejects based on count; the report is
    /// persisted first, and only reports that target a user feed the
    /// suspension counter.
    ///
    /// The count-then-set is a read followed by a conditional write with no
    /// transaction. Concurrent reports may each observe a count at or past
    /// the threshold and set the same flag, which is harmless because the
    /// write is idempotent. There is no automatic un-suspension.
    pub async fn file_report(
        &self,
        reporter_id: &str,
        target: ReportTarget,
        report_type: ReportType,
        description: Option<String>,
    ) -> Result<Report, ReportError> {
        let report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            reporter_id: reporter_id.to_string(),
            target,
            report_type,
            description,
            status: ReportStatus::Pending,
            created_at: chrono::Utc::now(),
        };

        self.store.insert_report(&report).await?;
        tracing::info!("Report {} filed by {}", report.id, reporter_id);

        if let Some(user_id) = report.target.user_id() {
            let count = self.store.count_reports_against_user(user_id).await?;
            if count >= self.suspension_threshold {
                self.store.set_user_suspended(user_id).await?;
                tracing::warn!(
                    "User {} suspended after {} reports (threshold {})",
                    user_id,
                    count,
                    self.suspension_threshold
                );
            }
        }

        Ok(report)
    }

    /// Total reports ever filed against a user.
    pub async fn report_count_for_user(&self, user_id: &str) -> Result<usize, ReportError> {
        Ok(self.store.count_reports_against_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAccount;
    use crate::services::memory::MemoryStore;

    fn subsystem(store: Arc<MemoryStore>) -> ReportingSubsystem {
        ReportingSubsystem::with_default_threshold(store)
    }

    #[tokio::test]
    async fn test_fourth_report_leaves_user_unsuspended() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(UserAccount {
            id: "target".to_string(),
            suspended: false,
        });
        let reporting = subsystem(store.clone());

        for i in 0..4 {
            reporting
                .file_report(
                    &format!("reporter_{}", i),
                    ReportTarget::User("target".to_string()),
                    ReportType::Spam,
                    None,
                )
                .await
                .unwrap();
        }

        assert_eq!(reporting.report_count_for_user("target").await.unwrap(), 4);
        let user = store.get_user("target").await.unwrap().unwrap();
        assert!(!user.suspended);
    }

    #[tokio::test]
    async fn test_fifth_report_suspends_user() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(UserAccount {
            id: "target".to_string(),
            suspended: false,
        });
        let reporting = subsystem(store.clone());

        for i in 0..5 {
            reporting
                .file_report(
                    &format!("reporter_{}", i),
                    ReportTarget::User("target".to_string()),
                    ReportType::Harassment,
                    Some("keeps messaging after being told to stop".to_string()),
                )
                .await
                .unwrap();
        }

        let user = store.get_user("target").await.unwrap().unwrap();
        assert!(user.suspended);
    }

    #[tokio::test]
    async fn test_mixed_report_types_all_count() {
        let store = Arc::new(MemoryStore::new());
        let reporting = subsystem(store.clone());

        let types = [
            ReportType::Fake,
            ReportType::Spam,
            ReportType::Harassment,
            ReportType::Inappropriate,
            ReportType::Other,
        ];
        for (i, report_type) in types.iter().enumerate() {
            reporting
                .file_report(
                    &format!("reporter_{}", i),
                    ReportTarget::User("target".to_string()),
                    *report_type,
                    None,
                )
                .await
                .unwrap();
        }

        let user = store.get_user("target").await.unwrap().unwrap();
        assert!(user.suspended);
    }

    #[tokio::test]
    async fn test_non_user_targets_do_not_feed_suspension() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(UserAccount {
            id: "owner".to_string(),
            suspended: false,
        });
        let reporting = subsystem(store.clone());

        for i in 0..6 {
            reporting
                .file_report(
                    &format!("reporter_{}", i),
                    ReportTarget::Profile("profile_of_owner".to_string()),
                    ReportType::Inappropriate,
                    None,
                )
                .await
                .unwrap();
        }

        assert_eq!(reporting.report_count_for_user("owner").await.unwrap(), 0);
        let user = store.get_user("owner").await.unwrap().unwrap();
        assert!(!user.suspended);
    }

    #[tokio::test]
    async fn test_intake_never_rejects_past_threshold() {
        let store = Arc::new(MemoryStore::new());
        let reporting = subsystem(store.clone());

        for i in 0..8 {
            let report = reporting
                .file_report(
                    &format!("reporter_{}", i),
                    ReportTarget::User("target".to_string()),
                    ReportType::Spam,
                    None,
                )
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Pending);
        }

        assert_eq!(reporting.report_count_for_user("target").await.unwrap(), 8);
    }
}
