use chrono::{DateTime, Utc};
use labs_common::{
    ActorId, Difficulty, DocumentGroupId, LabId, LabStatus, Slug, VersionId, WorkshopId,
};

/// The aggregate record representing one exercise. Owns the pointers to its
/// draft and published content versions; the pointers are mutated only by the
/// version lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Lab {
    pub id: LabId,
    pub workshop_id: WorkshopId,
    pub workshop_document_group_id: Option<DocumentGroupId>,
    pub slug: Slug,
    pub title: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub estimated_minutes: Option<i32>,
    pub status: LabStatus,
    pub current_draft_version_id: Option<VersionId>,
    pub latest_published_version_id: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub updated_at: DateTime<Utc>,
    pub updated_by: ActorId,
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_by: Option<ActorId>,
}

/// Request-side data for creating a lab.
#[derive(Debug, Clone)]
pub struct NewLab {
    pub workshop_id: WorkshopId,
    pub workshop_document_group_id: Option<DocumentGroupId>,
    pub slug: Slug,
    pub title: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub estimated_minutes: Option<i32>,
    pub status: LabStatus,
    pub created_by: ActorId,
    pub updated_by: ActorId,
}

impl Lab {
    /// A freshly created lab has no version pointers yet.
    pub fn create(new: NewLab, at: DateTime<Utc>) -> Self {
        Lab {
            id: LabId::generate(),
            workshop_id: new.workshop_id,
            workshop_document_group_id: new.workshop_document_group_id,
            slug: new.slug,
            title: new.title,
            summary: new.summary,
            tags: new.tags,
            difficulty: new.difficulty,
            estimated_minutes: new.estimated_minutes,
            status: new.status,
            current_draft_version_id: None,
            latest_published_version_id: None,
            created_at: at,
            created_by: new.created_by,
            updated_at: at,
            updated_by: new.updated_by,
            archived_at: None,
            archived_by: None,
        }
    }
}

/// Partial metadata update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct LabUpdate {
    pub slug: Option<Slug>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<Difficulty>,
    pub estimated_minutes: Option<i32>,
    pub updated_by: Option<ActorId>,
}

/// Listing filter for the labs surface.
#[derive(Debug, Clone, Default)]
pub struct LabFilter {
    pub workshop_id: Option<WorkshopId>,
    pub status: Option<LabStatus>,
    pub tag: Option<String>,
    /// Case-insensitive substring over title, summary and slug.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

pub const DEFAULT_LIST_LIMIT: i64 = 50;

impl LabFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }
}
