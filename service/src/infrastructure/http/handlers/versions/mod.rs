use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use labs_common::{LabId, VersionId};
use uuid::Uuid;

use crate::domain::AppState;
use crate::domain::version::{DraftPayload, PublishPayload};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::versions::dto::{
    DraftVersionRequest, PublishVersionRequest, VersionResponse,
};

pub mod dto;

pub async fn create_draft<S: AppState>(
    Path(lab_id): Path<Uuid>,
    State(state): State<S>,
    Json(body): Json<DraftVersionRequest>,
) -> Result<ApiSuccess<VersionResponse>, ApiError> {
    let payload = DraftPayload::try_from(body).map_err(ApiError::UnprocessableEntity)?;

    state
        .lifecycle()
        .create_draft(LabId(lab_id), payload)
        .await
        .map(|version| ApiSuccess::new(StatusCode::CREATED, VersionResponse::from(version)))
        .map_err(ApiError::from)
}

pub async fn list_versions<S: AppState>(
    Path(lab_id): Path<Uuid>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<VersionResponse>>, ApiError> {
    let versions = state.lifecycle().list_versions(LabId(lab_id)).await?;
    let result = versions
        .into_iter()
        .map(VersionResponse::from)
        .collect::<Vec<_>>();

    Ok(ApiSuccess::new(StatusCode::OK, result))
}

pub async fn get_version<S: AppState>(
    Path((lab_id, version_id)): Path<(Uuid, Uuid)>,
    State(state): State<S>,
) -> Result<ApiSuccess<VersionResponse>, ApiError> {
    state
        .lifecycle()
        .get_version(LabId(lab_id), VersionId(version_id))
        .await
        .map(|version| ApiSuccess::new(StatusCode::OK, VersionResponse::from(version)))
        .map_err(ApiError::from)
}

/// PATCH answers 200 with the superseding snapshot. The insert is an
/// implementation detail of draft supersession; to the caller this is an
/// update of the draft.
pub async fn patch_draft<S: AppState>(
    Path((lab_id, version_id)): Path<(Uuid, Uuid)>,
    State(state): State<S>,
    Json(body): Json<DraftVersionRequest>,
) -> Result<ApiSuccess<VersionResponse>, ApiError> {
    let payload = DraftPayload::try_from(body).map_err(ApiError::UnprocessableEntity)?;

    state
        .lifecycle()
        .patch_draft(LabId(lab_id), VersionId(version_id), payload)
        .await
        .map(|version| ApiSuccess::new(StatusCode::OK, VersionResponse::from(version)))
        .map_err(ApiError::from)
}

pub async fn publish_version<S: AppState>(
    Path((lab_id, version_id)): Path<(Uuid, Uuid)>,
    State(state): State<S>,
    Json(body): Json<PublishVersionRequest>,
) -> Result<ApiSuccess<VersionResponse>, ApiError> {
    state
        .lifecycle()
        .publish(LabId(lab_id), VersionId(version_id), PublishPayload::from(body))
        .await
        .map(|version| ApiSuccess::new(StatusCode::OK, VersionResponse::from(version)))
        .map_err(ApiError::from)
}
