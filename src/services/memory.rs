use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{CommunityRequest, MatchRecord, ModerationStatus, Profile, Report, UserAccount};
use crate::services::store::{BlobStore, DocumentStore, StoreError};

/// In-memory document store.
///
/// This is the injected fixture seam: tests seed it directly instead of
/// splicing dummy records into the production query path.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<Vec<Profile>>,
    requests: RwLock<Vec<CommunityRequest>>,
    reports: RwLock<Vec<Report>>,
    matches: RwLock<HashMap<(String, String), MatchRecord>>,
    users: RwLock<HashMap<String, UserAccount>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a community request directly (request intake is outside this
    /// core; tests and fixtures use this).
    pub fn seed_request(&self, request: CommunityRequest) {
        self.requests.write().unwrap().push(request);
    }

    /// Seed a user account directly.
    pub fn seed_user(&self, user: UserAccount) {
        self.users.write().unwrap().insert(user.id.clone(), user);
    }

    /// Seed a profile directly, bypassing photo verification.
    pub fn seed_profile(&self, profile: Profile) {
        self.profiles.write().unwrap().push(profile);
    }

    pub fn match_count(&self) -> usize {
        self.matches.read().unwrap().len()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.profiles.write().unwrap().push(profile.clone());
        Ok(())
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list_approved_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.status == ModerationStatus::Approved)
            .cloned()
            .collect())
    }

    async fn update_profile_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;
        profile.status = status;
        profile.admin_notes = notes;
        Ok(())
    }

    async fn get_request(&self, id: &str) -> Result<Option<CommunityRequest>, StoreError> {
        Ok(self
            .requests
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_request_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError> {
        let mut requests = self.requests.write().unwrap();
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("request {}", id)))?;
        request.status = status;
        request.admin_notes = notes;
        Ok(())
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        self.reports.write().unwrap().push(report.clone());
        Ok(())
    }

    async fn count_reports_against_user(&self, user_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .reports
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.target.user_id() == Some(user_id))
            .count())
    }

    async fn upsert_match(&self, record: &MatchRecord) -> Result<bool, StoreError> {
        let key = pair_key(&record.profile_id_1, &record.profile_id_2);
        let mut matches = self.matches.write().unwrap();
        if matches.contains_key(&key) {
            return Ok(false);
        }
        matches.insert(key, record.clone());
        Ok(true)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn set_user_suspended(&self, user_id: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserAccount {
                id: user_id.to_string(),
                suspended: false,
            });
        user.suspended = true;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        self.blobs
            .write()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(path.to_string())
    }
}
