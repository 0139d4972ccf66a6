use chrono::{DateTime, Utc};
use labs_common::{ActorId, LabId, VersionId, WorkshopDocumentId, WorkshopId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::embed::{EmbedFilter, LabEmbed, NewEmbed};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmbedRequest {
    pub lab_id: Uuid,
    pub workshop_id: Uuid,
    pub workshop_document_id: Uuid,
    pub block_id: String,
    pub block_type: Option<String>,
    pub pinned_version_id: Option<Uuid>,
    pub created_by: ActorId,
}

impl From<CreateEmbedRequest> for NewEmbed {
    fn from(value: CreateEmbedRequest) -> Self {
        NewEmbed {
            lab_id: LabId(value.lab_id),
            workshop_id: WorkshopId(value.workshop_id),
            workshop_document_id: WorkshopDocumentId(value.workshop_document_id),
            block_id: value.block_id,
            block_type: value.block_type,
            pinned_version_id: value.pinned_version_id.map(VersionId),
            created_by: value.created_by,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmbedsQuery {
    pub lab_id: Option<Uuid>,
    pub workshop_id: Option<Uuid>,
    pub workshop_document_id: Option<Uuid>,
}

impl From<ListEmbedsQuery> for EmbedFilter {
    fn from(value: ListEmbedsQuery) -> Self {
        EmbedFilter {
            lab_id: value.lab_id.map(LabId),
            workshop_id: value.workshop_id.map(WorkshopId),
            workshop_document_id: value.workshop_document_id.map(WorkshopDocumentId),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedResponse {
    pub id: Uuid,
    pub lab_id: Uuid,
    pub workshop_id: Uuid,
    pub workshop_document_id: Uuid,
    pub block_id: String,
    pub block_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<LabEmbed> for EmbedResponse {
    fn from(embed: LabEmbed) -> Self {
        EmbedResponse {
            id: embed.id.0,
            lab_id: embed.lab_id.0,
            workshop_id: embed.workshop_id.0,
            workshop_document_id: embed.workshop_document_id.0,
            block_id: embed.block_id,
            block_type: embed.block_type,
            pinned_version_id: embed.pinned_version_id.map(|id| id.0),
            created_at: embed.created_at,
            created_by: embed.created_by.into_inner(),
        }
    }
}
