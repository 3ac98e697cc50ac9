//! KYC Routes
//!
//! - GET /api/v1/kyc - The investor's latest KYC request
//! - POST /api/v1/kyc/documents?file_name=..&document_type=.. - Upload a
//!   document; the request body is the raw file and `Content-Type` its type

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::KycUploadParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::auth::Permission;
use crate::models::KycRequest;
use crate::services::DocumentUpload;

/// GET /api/v1/kyc
pub async fn latest_kyc(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Option<KycRequest>>> {
    user.require(Permission::SubmitKyc)?;
    Ok(Json(state.kyc.latest_for_user(&user.0.user_id).await?))
}

/// POST /api/v1/kyc/documents
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    params: Result<Query<KycUploadParams>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<KycRequest>)> {
    user.require(Permission::SubmitKyc)?;
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .ok_or_else(|| ApiError::Validation("Content-Type header is required".to_string()))?;

    let request = state
        .kyc
        .submit(
            &user.0.user_id,
            DocumentUpload {
                file_name: params.file_name,
                content_type,
                document_type: params.document_type,
                bytes: body.to_vec(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}
