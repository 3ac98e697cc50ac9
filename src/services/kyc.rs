//! KYC
//!
//! Investors upload an identity document; the upload lands in the documents
//! bucket and a `Submitted` KYC row points at it. Admin checkers then write
//! any status onto the row.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{records, DataError, DataSource, Query, Row, Table};
use crate::models::{KycRequest, KycStatus};

const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// A document upload
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub document_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum KycError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("KYC request {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// KYC operations
#[derive(Clone)]
pub struct KycService {
    data: Arc<dyn DataSource>,
    bucket: String,
}

impl KycService {
    pub fn new(data: Arc<dyn DataSource>, bucket: impl Into<String>) -> Self {
        Self {
            data,
            bucket: bucket.into(),
        }
    }

    /// Upload the document and record a `Submitted` request
    pub async fn submit(&self, user_id: &str, upload: DocumentUpload) -> Result<KycRequest, KycError> {
        if upload.bytes.is_empty() {
            return Err(KycError::Validation("Document is empty".to_string()));
        }
        if !ACCEPTED_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
            return Err(KycError::Validation(format!(
                "Unsupported document type {}. Upload a PDF, JPEG or PNG",
                upload.content_type
            )));
        }
        let file_name = sanitize_file_name(&upload.file_name)
            .ok_or_else(|| KycError::Validation("Invalid file name".to_string()))?;

        let id = uuid::Uuid::new_v4().to_string();
        let path = format!("kyc/{}/{}-{}", user_id, id, file_name);
        let key = self
            .data
            .upload(&self.bucket, &path, &upload.content_type, upload.bytes)
            .await?;

        let request = KycRequest {
            id,
            user_id: user_id.to_string(),
            status: KycStatus::Submitted,
            document_path: Some(key),
            document_type: upload.document_type,
            remarks: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let stored = records::insert_record(self.data.as_ref(), Table::KycRequests, &request).await?;
        tracing::info!(kyc_id = %stored.id, user_id = %user_id, "KYC document submitted");
        Ok(stored)
    }

    /// Most recent KYC request of a user
    pub async fn latest_for_user(&self, user_id: &str) -> Result<Option<KycRequest>, KycError> {
        let query = Query::table(Table::KycRequests)
            .eq("user_id", user_id)
            .order_desc("created_at")
            .limit(1);
        let mut requests: Vec<KycRequest> = records::fetch_all(self.data.as_ref(), &query).await?;
        Ok(requests.pop())
    }

    /// All KYC requests, optionally by status, oldest first
    pub async fn list(&self, status: Option<KycStatus>) -> Result<Vec<KycRequest>, KycError> {
        let mut query = Query::table(Table::KycRequests).order_asc("created_at");
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }

    /// Write a status (and optional remarks) on a KYC request
    pub async fn update_status(
        &self,
        id: &str,
        status: KycStatus,
        remarks: Option<String>,
    ) -> Result<KycRequest, KycError> {
        let mut changes = Row::new();
        changes.insert("status".to_string(), Value::from(status.as_str()));
        changes.insert("updated_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        if let Some(remarks) = remarks {
            changes.insert("remarks".to_string(), Value::from(remarks));
        }

        match records::update_record(self.data.as_ref(), Table::KycRequests, id, changes).await {
            Ok(request) => Ok(request),
            Err(DataError::NotFound { .. }) => Err(KycError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep the final path component, restricted to a safe character set
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') || cleaned.len() > 128 {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixtureBackend;

    fn pdf(name: &str) -> DocumentUpload {
        DocumentUpload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            document_type: Some("PAN".to_string()),
            bytes: b"%PDF-1.4 test".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_submit_uploads_and_records() {
        let backend = Arc::new(FixtureBackend::empty());
        let service = KycService::new(backend.clone(), "kyc-documents");

        let request = service.submit("user-1", pdf("pan card.pdf")).await.unwrap();

        assert_eq!(request.status, KycStatus::Submitted);
        let key = request.document_path.clone().unwrap();
        assert!(key.starts_with("kyc-documents/kyc/user-1/"));
        assert!(key.ends_with("-pan_card.pdf"));
        assert_eq!(backend.blob(&key).await.unwrap(), b"%PDF-1.4 test".to_vec());

        let latest = service.latest_for_user("user-1").await.unwrap().unwrap();
        assert_eq!(latest.id, request.id);
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_uploads() {
        let backend = Arc::new(FixtureBackend::empty());
        let service = KycService::new(backend.clone(), "kyc-documents");

        let mut empty = pdf("a.pdf");
        empty.bytes.clear();
        assert!(matches!(service.submit("u", empty).await, Err(KycError::Validation(_))));

        let mut exe = pdf("a.exe");
        exe.content_type = "application/x-msdownload".to_string();
        assert!(matches!(service.submit("u", exe).await, Err(KycError::Validation(_))));

        assert!(matches!(
            service.submit("u", pdf("../..")).await,
            Err(KycError::Validation(_))
        ));

        assert_eq!(backend.row_count(Table::KycRequests).await, 0);
    }

    #[tokio::test]
    async fn test_update_status_and_filter() {
        let service = KycService::new(Arc::new(FixtureBackend::seeded()), "kyc-documents");

        let submitted = service.list(Some(KycStatus::Submitted)).await.unwrap();
        assert_eq!(submitted.len(), 1);

        let updated = service
            .update_status("kyc-1", KycStatus::Rejected, Some("Blurry scan".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.status, KycStatus::Rejected);
        assert_eq!(updated.remarks.as_deref(), Some("Blurry scan"));
        assert!(updated.updated_at.is_some());

        // Rejected straight to Approved is allowed
        let updated = service
            .update_status("kyc-1", KycStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(updated.status, KycStatus::Approved);

        assert!(matches!(
            service.update_status("nope", KycStatus::Approved, None).await,
            Err(KycError::NotFound(_))
        ));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("C:\\docs\\aadhaar.png").as_deref(), Some("aadhaar.png"));
        assert_eq!(sanitize_file_name("dir/sub/pan (1).pdf").as_deref(), Some("pan__1_.pdf"));
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name(".."), None);
    }
}
