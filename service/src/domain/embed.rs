use chrono::{DateTime, Utc};
use labs_common::{ActorId, EmbedId, LabId, VersionId, WorkshopDocumentId, WorkshopId};

pub const DEFAULT_BLOCK_TYPE: &str = "handsOnLab";

/// Links a lab (and optionally a pinned version) to an editor block inside a
/// workshop document. Pure bookkeeping; no lifecycle rules.
#[derive(Debug, Clone, PartialEq)]
pub struct LabEmbed {
    pub id: EmbedId,
    pub lab_id: LabId,
    pub workshop_id: WorkshopId,
    pub workshop_document_id: WorkshopDocumentId,
    pub block_id: String,
    pub block_type: String,
    pub pinned_version_id: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
}

#[derive(Debug, Clone)]
pub struct NewEmbed {
    pub lab_id: LabId,
    pub workshop_id: WorkshopId,
    pub workshop_document_id: WorkshopDocumentId,
    pub block_id: String,
    pub block_type: Option<String>,
    pub pinned_version_id: Option<VersionId>,
    pub created_by: ActorId,
}

impl LabEmbed {
    pub fn create(new: NewEmbed, at: DateTime<Utc>) -> Self {
        LabEmbed {
            id: EmbedId::generate(),
            lab_id: new.lab_id,
            workshop_id: new.workshop_id,
            workshop_document_id: new.workshop_document_id,
            block_id: new.block_id,
            block_type: new.block_type.unwrap_or_else(|| DEFAULT_BLOCK_TYPE.to_owned()),
            pinned_version_id: new.pinned_version_id,
            created_at: at,
            created_by: new.created_by,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmbedFilter {
    pub lab_id: Option<LabId>,
    pub workshop_id: Option<WorkshopId>,
    pub workshop_document_id: Option<WorkshopDocumentId>,
}
