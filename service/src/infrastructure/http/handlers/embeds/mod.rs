use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use labs_common::EmbedId;
use uuid::Uuid;

use crate::domain::AppState;
use crate::domain::embed::{EmbedFilter, LabEmbed, NewEmbed};
use crate::domain::store::{EmbedStore, LabStore};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::embeds::dto::{
    CreateEmbedRequest, EmbedResponse, ListEmbedsQuery,
};

pub mod dto;

pub async fn create_embed<S: AppState>(
    State(state): State<S>,
    Json(body): Json<CreateEmbedRequest>,
) -> Result<ApiSuccess<EmbedResponse>, ApiError> {
    let new = NewEmbed::from(body);
    if !state.labs().exists(new.lab_id).await? {
        return Err(ApiError::NotFound(format!(
            "Lab \"{}\" not found",
            new.lab_id
        )));
    }
    let embed = LabEmbed::create(new, Utc::now());

    state
        .embeds()
        .insert(embed)
        .await
        .map(|embed| ApiSuccess::new(StatusCode::CREATED, EmbedResponse::from(embed)))
        .map_err(ApiError::from)
}

pub async fn list_embeds<S: AppState>(
    Query(query): Query<ListEmbedsQuery>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<EmbedResponse>>, ApiError> {
    let embeds = state.embeds().list(EmbedFilter::from(query)).await?;
    let result = embeds
        .into_iter()
        .map(EmbedResponse::from)
        .collect::<Vec<_>>();

    Ok(ApiSuccess::new(StatusCode::OK, result))
}

pub async fn remove_embed<S: AppState>(
    Path(embed_id): Path<Uuid>,
    State(state): State<S>,
) -> Result<StatusCode, ApiError> {
    let removed = state.embeds().remove(EmbedId(embed_id)).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Embed \"{embed_id}\" not found")))
    }
}
