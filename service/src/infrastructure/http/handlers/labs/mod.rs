use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use labs_common::LabId;
use uuid::Uuid;

use crate::domain::AppState;
use crate::domain::lab::{Lab, LabFilter, LabUpdate, NewLab};
use crate::domain::store::LabStore;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::labs::dto::{
    ArchiveLabRequest, CreateLabRequest, LabResponse, ListLabsQuery, UpdateLabRequest,
};

pub mod dto;

pub async fn create_lab<S: AppState>(
    State(state): State<S>,
    Json(body): Json<CreateLabRequest>,
) -> Result<ApiSuccess<LabResponse>, ApiError> {
    let new = NewLab::try_from(body).map_err(ApiError::UnprocessableEntity)?;
    let lab = Lab::create(new, Utc::now());

    state
        .labs()
        .insert(lab)
        .await
        .map(|lab| ApiSuccess::new(StatusCode::CREATED, LabResponse::from(lab)))
        .map_err(ApiError::from)
}

pub async fn list_labs<S: AppState>(
    Query(query): Query<ListLabsQuery>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<LabResponse>>, ApiError> {
    let filter = LabFilter::try_from(query).map_err(ApiError::UnprocessableEntity)?;

    let labs = state.labs().list(filter).await?;
    let result = labs.into_iter().map(LabResponse::from).collect::<Vec<_>>();

    Ok(ApiSuccess::new(StatusCode::OK, result))
}

pub async fn get_lab<S: AppState>(
    Path(lab_id): Path<Uuid>,
    State(state): State<S>,
) -> Result<ApiSuccess<LabResponse>, ApiError> {
    let lab = state
        .labs()
        .find(LabId(lab_id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lab \"{lab_id}\" not found")))?;

    Ok(ApiSuccess::new(StatusCode::OK, LabResponse::from(lab)))
}

pub async fn update_lab<S: AppState>(
    Path(lab_id): Path<Uuid>,
    State(state): State<S>,
    Json(body): Json<UpdateLabRequest>,
) -> Result<ApiSuccess<LabResponse>, ApiError> {
    let update = LabUpdate::try_from(body).map_err(ApiError::UnprocessableEntity)?;

    let lab = state
        .labs()
        .update_meta(LabId(lab_id), update, Utc::now())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lab \"{lab_id}\" not found")))?;

    Ok(ApiSuccess::new(StatusCode::OK, LabResponse::from(lab)))
}

pub async fn archive_lab<S: AppState>(
    Path(lab_id): Path<Uuid>,
    State(state): State<S>,
    Json(body): Json<ArchiveLabRequest>,
) -> Result<ApiSuccess<LabResponse>, ApiError> {
    let lab = state
        .labs()
        .archive(LabId(lab_id), body.archived_by, Utc::now())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lab \"{lab_id}\" not found")))?;

    Ok(ApiSuccess::new(StatusCode::OK, LabResponse::from(lab)))
}
