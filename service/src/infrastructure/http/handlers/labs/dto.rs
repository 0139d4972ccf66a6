use chrono::{DateTime, Utc};
use labs_common::{ActorId, Difficulty, DocumentGroupId, LabStatus, Slug, WorkshopId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lab::{Lab, LabFilter, LabUpdate, NewLab};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabRequest {
    pub workshop_id: Uuid,
    pub workshop_document_group_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub created_by: ActorId,
}

impl TryFrom<CreateLabRequest> for NewLab {
    type Error = String;

    fn try_from(value: CreateLabRequest) -> Result<Self, Self::Error> {
        let slug = Slug::try_new(value.slug).map_err(|e| e.to_string())?;
        let difficulty = parse_difficulty(value.difficulty)?;

        Ok(NewLab {
            workshop_id: WorkshopId(value.workshop_id),
            workshop_document_group_id: value.workshop_document_group_id.map(DocumentGroupId),
            slug,
            title: value.title,
            summary: value.summary,
            tags: value.tags.unwrap_or_default(),
            difficulty,
            estimated_minutes: value.estimated_minutes,
            status: LabStatus::Draft,
            created_by: value.created_by.clone(),
            updated_by: value.created_by,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub updated_by: Option<ActorId>,
}

impl TryFrom<UpdateLabRequest> for LabUpdate {
    type Error = String;

    fn try_from(value: UpdateLabRequest) -> Result<Self, Self::Error> {
        let slug = value.slug.map(Slug::try_new).transpose().map_err(|e| e.to_string())?;
        let difficulty = parse_difficulty(value.difficulty)?;

        Ok(LabUpdate {
            slug,
            title: value.title,
            summary: value.summary,
            tags: value.tags,
            difficulty,
            estimated_minutes: value.estimated_minutes,
            updated_by: value.updated_by,
        })
    }
}

fn parse_difficulty(value: Option<String>) -> Result<Option<Difficulty>, String> {
    match value {
        Some(difficulty) => Difficulty::parse(&difficulty)
            .map(Some)
            .ok_or_else(|| format!("unknown difficulty \"{difficulty}\"")),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveLabRequest {
    pub archived_by: ActorId,
}

/// Query parameters of the lab listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLabsQuery {
    pub workshop_id: Option<Uuid>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl TryFrom<ListLabsQuery> for LabFilter {
    type Error = String;

    fn try_from(value: ListLabsQuery) -> Result<Self, Self::Error> {
        let status = match value.status {
            Some(status) => Some(
                LabStatus::parse(&status)
                    .ok_or_else(|| "status must be draft|published|archived".to_string())?,
            ),
            None => None,
        };

        Ok(LabFilter {
            workshop_id: value.workshop_id.map(WorkshopId),
            status,
            tag: value.tag,
            q: value.q,
            limit: value.limit,
            skip: value.skip,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResponse {
    pub id: Uuid,
    pub workshop_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workshop_document_group_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    pub status: LabStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_draft_version_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_published_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<String>,
}

impl From<Lab> for LabResponse {
    fn from(lab: Lab) -> Self {
        LabResponse {
            id: lab.id.0,
            workshop_id: lab.workshop_id.0,
            workshop_document_group_id: lab.workshop_document_group_id.map(|id| id.0),
            slug: lab.slug.into_inner(),
            title: lab.title,
            summary: lab.summary,
            tags: lab.tags,
            difficulty: lab.difficulty,
            estimated_minutes: lab.estimated_minutes,
            status: lab.status,
            current_draft_version_id: lab.current_draft_version_id.map(|id| id.0),
            latest_published_version_id: lab.latest_published_version_id.map(|id| id.0),
            created_at: lab.created_at,
            created_by: lab.created_by.into_inner(),
            updated_at: lab.updated_at,
            updated_by: lab.updated_by.into_inner(),
            archived_at: lab.archived_at,
            archived_by: lab.archived_by.map(|a| a.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_request_normalizes_slug_and_defaults() {
        let request: CreateLabRequest = serde_json::from_value(json!({
            "workshopId": "7f1f9a40-0000-4000-8000-000000000001",
            "slug": "  Two-Sum  ",
            "title": "Two Sum",
            "createdBy": "author-1"
        }))
        .unwrap();

        let new = NewLab::try_from(request).unwrap();
        assert_eq!(new.slug.as_ref(), "two-sum");
        assert_eq!(new.status, LabStatus::Draft);
        assert!(new.tags.is_empty());
        assert_eq!(new.updated_by, new.created_by);
    }

    #[test]
    fn bad_difficulty_is_rejected() {
        let request: CreateLabRequest = serde_json::from_value(json!({
            "workshopId": "7f1f9a40-0000-4000-8000-000000000001",
            "slug": "two-sum",
            "title": "Two Sum",
            "difficulty": "brutal",
            "createdBy": "author-1"
        }))
        .unwrap();

        assert!(NewLab::try_from(request).is_err());
    }

    #[test]
    fn unknown_status_filter_is_rejected_with_a_stable_message() {
        let query = ListLabsQuery {
            status: Some("live".to_string()),
            ..ListLabsQuery::default()
        };

        let err = LabFilter::try_from(query).unwrap_err();
        assert_eq!(err, "status must be draft|published|archived");
    }
}
