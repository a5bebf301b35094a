use std::sync::Arc;

use thiserror::Error;

use crate::models::{ModeratedKind, ModerationDecision, ModerationStatus};
use crate::services::store::{DocumentStore, StoreError};

/// Errors from the moderation workflow.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("{kind:?} {id} not found")]
    NotFound { kind: ModeratedKind, id: String },

    #[error("{kind:?} {id} is {current}; only pending entities can be moderated")]
    InvalidTransition {
        kind: ModeratedKind,
        id: String,
        current: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pending -> approved/rejected state machine, applied uniformly to profiles
/// and community requests. Both target states are terminal.
#[derive(Clone)]
pub struct ModerationWorkflow {
    store: Arc<dyn DocumentStore>,
}

impl ModerationWorkflow {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Apply an admin decision to a pending entity, writing the new status
    /// and optional note in a single store update.
    ///
    /// Fails with `InvalidTransition` when the entity is not pending
    /// (rejecting an already-rejected entity is an error, not a no-op) and
    /// `NotFound` when the id does not resolve. Admin capability is
    /// enforced by the caller.
    pub async fn moderate(
        &self,
        kind: ModeratedKind,
        entity_id: &str,
        decision: ModerationDecision,
        notes: Option<String>,
    ) -> Result<ModerationStatus, ModerationError> {
        let current = match kind {
            ModeratedKind::Profile => self
                .store
                .get_profile(entity_id)
                .await?
                .map(|p| p.status),
            ModeratedKind::Request => self
                .store
                .get_request(entity_id)
                .await?
                .map(|r| r.status),
        };

        let current = current.ok_or_else(|| ModerationError::NotFound {
            kind,
            id: entity_id.to_string(),
        })?;

        if current != ModerationStatus::Pending {
            return Err(ModerationError::InvalidTransition {
                kind,
                id: entity_id.to_string(),
                current: current.as_str(),
            });
        }

        let target: ModerationStatus = decision.into();
        match kind {
            ModeratedKind::Profile => {
                self.store
                    .update_profile_status(entity_id, target, notes)
                    .await?
            }
            ModeratedKind::Request => {
                self.store
                    .update_request_status(entity_id, target, notes)
                    .await?
            }
        }

        tracing::info!(
            "Moderated {:?} {}: pending -> {}",
            kind,
            entity_id,
            target.as_str()
        );

        Ok(target)
    }
}
