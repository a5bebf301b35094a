use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::models::{CommunityRequest, MatchRecord, ModerationStatus, Profile, Report, UserAccount};
use crate::services::store::{BlobStore, DocumentStore, StoreError};

/// Collection and bucket IDs in Appwrite.
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub profiles: String,
    pub requests: String,
    pub reports: String,
    pub matches: String,
    pub users: String,
    pub photo_bucket: String,
}

/// Appwrite-backed document store.
///
/// Handles all persistence for the moderation/matching core: profiles,
/// community requests, reports, match records, user accounts, and the photo
/// bucket.
pub struct AppwriteStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

impl AppwriteStore {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<(u64, Vec<Value>), StoreError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let url = format!(
            "{}?query={}",
            self.documents_url(collection),
            urlencoding::encode(&queries_json)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to list {}: {}",
                collection,
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);
        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?
            .clone();

        Ok((total, documents))
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(self.document_url(collection, id))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            s if !s.is_success() => Err(StoreError::ApiError(format!(
                "Failed to fetch {}/{}: {}",
                collection, id, s
            ))),
            _ => Ok(Some(response.json().await?)),
        }
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        mut payload: Value,
    ) -> Result<(), StoreError> {
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("$id".to_string(), Value::String(id.to_string()));
        }

        let response = self
            .client
            .post(self.documents_url(collection))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to create document in {}: {}",
                collection,
                response.status()
            )));
        }

        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.document_url(collection, id))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&serde_json::json!({ "data": partial }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(format!("{}/{}", collection, id))),
            s if !s.is_success() => Err(StoreError::ApiError(format!(
                "Failed to update {}/{}: {}",
                collection, id, s
            ))),
            _ => Ok(()),
        }
    }

    fn parse_document<T: serde::de::DeserializeOwned>(doc: &Value) -> Result<T, StoreError> {
        let data = doc.get("data").unwrap_or(doc);
        serde_json::from_value(data.clone())
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse document: {}", e)))
    }

    /// Reports are stored flat: the single-target enum becomes one of four
    /// id columns, matching the app's document shape and keeping equality
    /// queries trivial.
    fn report_document(report: &Report) -> Value {
        let mut doc = serde_json::json!({
            "reporterId": report.reporter_id,
            "type": report.report_type,
            "description": report.description,
            "status": report.status,
            "createdAt": report.created_at,
        });
        let column = match &report.target {
            crate::models::ReportTarget::User(id) => ("reportedUserId", id),
            crate::models::ReportTarget::Post(id) => ("reportedPostId", id),
            crate::models::ReportTarget::Request(id) => ("reportedRequestId", id),
            crate::models::ReportTarget::Profile(id) => ("reportedProfileId", id),
        };
        if let Some(obj) = doc.as_object_mut() {
            obj.insert(column.0.to_string(), Value::String(column.1.clone()));
        }
        doc
    }
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let payload = serde_json::to_value(profile)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        self.create_document(&self.collections.profiles, &profile.id, payload)
            .await
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        match self.get_document(&self.collections.profiles, id).await? {
            Some(doc) => Ok(Some(Self::parse_document(&doc)?)),
            None => Ok(None),
        }
    }

    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let queries = vec![format!("equal(\"userId\", \"{}\")", user_id)];
        let (_, documents) = self
            .list_documents(&self.collections.profiles, &queries)
            .await?;

        documents
            .first()
            .map(Self::parse_document)
            .transpose()
    }

    async fn list_approved_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let queries = vec![format!(
            "equal(\"status\", \"{}\")",
            ModerationStatus::Approved.as_str()
        )];
        let (total, documents) = self
            .list_documents(&self.collections.profiles, &queries)
            .await?;

        let profiles: Vec<Profile> = documents
            .iter()
            .filter_map(|doc| Self::parse_document(doc).ok())
            .collect();

        tracing::debug!("Listed {} approved profiles (total: {})", profiles.len(), total);
        Ok(profiles)
    }

    async fn update_profile_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError> {
        self.update_document(
            &self.collections.profiles,
            id,
            serde_json::json!({ "status": status, "adminNotes": notes }),
        )
        .await
    }

    async fn get_request(&self, id: &str) -> Result<Option<CommunityRequest>, StoreError> {
        match self.get_document(&self.collections.requests, id).await? {
            Some(doc) => Ok(Some(Self::parse_document(&doc)?)),
            None => Ok(None),
        }
    }

    async fn update_request_status(
        &self,
        id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<(), StoreError> {
        self.update_document(
            &self.collections.requests,
            id,
            serde_json::json!({ "status": status, "adminNotes": notes }),
        )
        .await
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        self.create_document(
            &self.collections.reports,
            &report.id,
            Self::report_document(report),
        )
        .await
    }

    async fn count_reports_against_user(&self, user_id: &str) -> Result<usize, StoreError> {
        let queries = vec![format!("equal(\"reportedUserId\", \"{}\")", user_id)];
        let (total, _) = self
            .list_documents(&self.collections.reports, &queries)
            .await?;
        Ok(total as usize)
    }

    async fn upsert_match(&self, record: &MatchRecord) -> Result<bool, StoreError> {
        // Pair ids are stored in sorted order so the pair is a natural key.
        let (first, second) = if record.profile_id_1 <= record.profile_id_2 {
            (&record.profile_id_1, &record.profile_id_2)
        } else {
            (&record.profile_id_2, &record.profile_id_1)
        };

        let queries = vec![
            format!("equal(\"profileId1\", \"{}\")", first),
            format!("equal(\"profileId2\", \"{}\")", second),
        ];
        let (total, _) = self
            .list_documents(&self.collections.matches, &queries)
            .await?;
        if total > 0 {
            return Ok(false);
        }

        let payload = serde_json::json!({
            "profileId1": first,
            "profileId2": second,
            "score": record.score,
            "status": record.status,
            "createdAt": record.created_at,
        });
        self.create_document(&self.collections.matches, &record.id, payload)
            .await?;
        Ok(true)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserAccount>, StoreError> {
        match self.get_document(&self.collections.users, id).await? {
            Some(doc) => Ok(Some(Self::parse_document(&doc)?)),
            None => Ok(None),
        }
    }

    async fn set_user_suspended(&self, user_id: &str) -> Result<(), StoreError> {
        self.update_document(
            &self.collections.users,
            user_id,
            serde_json::json!({ "suspended": true }),
        )
        .await
    }
}

#[async_trait]
impl BlobStore for AppwriteStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let url = format!(
            "{}/storage/buckets/{}/files",
            self.base_url.trim_end_matches('/'),
            self.collections.photo_bucket
        );

        let file_id = uuid::Uuid::new_v4().to_string();
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(path.to_string());
        let form = reqwest::multipart::Form::new()
            .text("fileId", file_id.clone())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to upload photo: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        Ok(json
            .get("$id")
            .and_then(|v| v.as_str())
            .unwrap_or(&file_id)
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportStatus, ReportTarget, ReportType};

    #[test]
    fn test_store_creation() {
        let collections = AppwriteCollections {
            profiles: "profiles".to_string(),
            requests: "requests".to_string(),
            reports: "reports".to_string(),
            matches: "matches".to_string(),
            users: "users".to_string(),
            photo_bucket: "photos".to_string(),
        };

        let store = AppwriteStore::new(
            "https://appwrite.test/v1".to_string(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            collections,
        )
        .unwrap();

        assert_eq!(store.base_url, "https://appwrite.test/v1");
        assert_eq!(
            store.document_url("profiles", "p1"),
            "https://appwrite.test/v1/databases/test_db/collections/profiles/documents/p1"
        );
    }

    #[test]
    fn test_report_document_flattens_target() {
        let report = Report {
            id: "r1".to_string(),
            reporter_id: "u1".to_string(),
            target: ReportTarget::User("u2".to_string()),
            report_type: ReportType::Spam,
            description: None,
            status: ReportStatus::Pending,
            created_at: chrono::Utc::now(),
        };

        let doc = AppwriteStore::report_document(&report);
        assert_eq!(doc.get("reportedUserId").unwrap(), "u2");
        assert!(doc.get("reportedProfileId").is_none());
        assert_eq!(doc.get("type").unwrap(), "spam");
    }
}
