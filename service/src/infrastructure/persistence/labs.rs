use chrono::{DateTime, Utc};
use labs_common::{
    ActorId, Difficulty, DocumentGroupId, LABS_TABLE, LabId, LabStatus, Slug, VersionId,
    WorkshopId, database::Database,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{
    lab::{Lab, LabFilter, LabUpdate},
    store::{LabStore, StoreError},
};
use crate::infrastructure::persistence::{classify_write_error, database_error};

pub const SLUG_CONFLICT_MSG: &str = "A lab with this workshopId + slug already exists";

const LAB_COLUMNS: &str = "id, workshop_id, workshop_document_group_id, slug, title, summary, \
     tags, difficulty, estimated_minutes, status, current_draft_version_id, \
     latest_published_version_id, created_at, created_by, updated_at, updated_by, \
     archived_at, archived_by";

#[derive(Clone)]
pub struct PostgresLabStore {
    database: &'static Database,
}

impl PostgresLabStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn table(&self) -> String {
        format!("{}.{}", self.database.database_schema(), LABS_TABLE)
    }
}

impl LabStore for PostgresLabStore {
    async fn insert(&self, lab: Lab) -> Result<Lab, StoreError> {
        let sql = format!(
            "INSERT INTO {} ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
            self.table(),
            LAB_COLUMNS
        );

        sqlx::query(&sql)
            .bind(lab.id.0)
            .bind(lab.workshop_id.0)
            .bind(lab.workshop_document_group_id.map(|id| id.0))
            .bind(lab.slug.as_ref())
            .bind(&lab.title)
            .bind(&lab.summary)
            .bind(Json(&lab.tags))
            .bind(lab.difficulty.map(|d| d.as_str()))
            .bind(lab.estimated_minutes)
            .bind(lab.status.as_str())
            .bind(lab.current_draft_version_id.map(|id| id.0))
            .bind(lab.latest_published_version_id.map(|id| id.0))
            .bind(lab.created_at)
            .bind(lab.created_by.as_ref())
            .bind(lab.updated_at)
            .bind(lab.updated_by.as_ref())
            .bind(lab.archived_at)
            .bind(lab.archived_by.as_ref().map(|a| a.as_ref().to_owned()))
            .execute(self.database.database_pool())
            .await
            .map_err(|e| classify_write_error("failed to insert lab", SLUG_CONFLICT_MSG, e))?;

        Ok(lab)
    }

    async fn find(&self, id: LabId) -> Result<Option<Lab>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", LAB_COLUMNS, self.table());

        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to load lab", e))?;

        row.map(|row| row_to_lab(&row)).transpose()
    }

    async fn exists(&self, id: LabId) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", self.table());

        sqlx::query_scalar(&sql)
            .bind(id.0)
            .fetch_one(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to check lab existence", e))
    }

    async fn list(&self, filter: LabFilter) -> Result<Vec<Lab>, StoreError> {
        let mut sql = format!("SELECT {} FROM {} WHERE TRUE", LAB_COLUMNS, self.table());
        let mut next_param = 1;

        if filter.workshop_id.is_some() {
            sql.push_str(&format!(" AND workshop_id = ${}", next_param));
            next_param += 1;
        }
        if filter.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", next_param));
            next_param += 1;
        }
        if filter.tag.is_some() {
            sql.push_str(&format!(" AND tags @> ${}", next_param));
            next_param += 1;
        }
        if filter.q.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${p} OR summary ILIKE ${p} OR slug ILIKE ${p})",
                p = next_param
            ));
            next_param += 1;
        }
        sql.push_str(&format!(
            " ORDER BY updated_at DESC LIMIT ${} OFFSET ${}",
            next_param,
            next_param + 1
        ));

        let mut query = sqlx::query(&sql);
        if let Some(workshop_id) = filter.workshop_id {
            query = query.bind(workshop_id.0);
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(tag) = &filter.tag {
            query = query.bind(Json(vec![tag.clone()]));
        }
        if let Some(q) = &filter.q {
            query = query.bind(format!("%{}%", escape_like(q)));
        }
        let rows = query
            .bind(filter.limit())
            .bind(filter.skip())
            .fetch_all(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to list labs", e))?;

        rows.iter().map(row_to_lab).collect()
    }

    async fn update_meta(
        &self,
        id: LabId,
        update: LabUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Lab>, StoreError> {
        let mut sql = format!("UPDATE {} SET updated_at = $2", self.table());
        let mut next_param = 3;

        for (present, column) in [
            (update.slug.is_some(), "slug"),
            (update.title.is_some(), "title"),
            (update.summary.is_some(), "summary"),
            (update.tags.is_some(), "tags"),
            (update.difficulty.is_some(), "difficulty"),
            (update.estimated_minutes.is_some(), "estimated_minutes"),
            (update.updated_by.is_some(), "updated_by"),
        ] {
            if present {
                sql.push_str(&format!(", {} = ${}", column, next_param));
                next_param += 1;
            }
        }
        sql.push_str(&format!(" WHERE id = $1 RETURNING {}", LAB_COLUMNS));

        let mut query = sqlx::query(&sql).bind(id.0).bind(updated_at);
        if let Some(slug) = &update.slug {
            query = query.bind(slug.as_ref().to_owned());
        }
        if let Some(title) = update.title {
            query = query.bind(title);
        }
        if let Some(summary) = update.summary {
            query = query.bind(summary);
        }
        if let Some(tags) = update.tags {
            query = query.bind(Json(tags));
        }
        if let Some(difficulty) = update.difficulty {
            query = query.bind(difficulty.as_str());
        }
        if let Some(estimated_minutes) = update.estimated_minutes {
            query = query.bind(estimated_minutes);
        }
        if let Some(updated_by) = &update.updated_by {
            query = query.bind(updated_by.as_ref().to_owned());
        }

        let row = query
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| classify_write_error("failed to update lab", SLUG_CONFLICT_MSG, e))?;

        row.map(|row| row_to_lab(&row)).transpose()
    }

    async fn archive(
        &self,
        id: LabId,
        archived_by: ActorId,
        archived_at: DateTime<Utc>,
    ) -> Result<Option<Lab>, StoreError> {
        let sql = format!(
            "UPDATE {} SET status = 'archived', archived_at = $2, archived_by = $3, \
             updated_at = $2, updated_by = $3 WHERE id = $1 RETURNING {}",
            self.table(),
            LAB_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.0)
            .bind(archived_at)
            .bind(archived_by.as_ref())
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to archive lab", e))?;

        row.map(|row| row_to_lab(&row)).transpose()
    }

    async fn set_current_draft(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET current_draft_version_id = $2, updated_at = $3, updated_by = $4 \
             WHERE id = $1",
            self.table()
        );

        sqlx::query(&sql)
            .bind(id.0)
            .bind(version_id.0)
            .bind(updated_at)
            .bind(updated_by.as_ref())
            .execute(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to move draft pointer", e))?;

        Ok(())
    }

    async fn set_published(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET latest_published_version_id = $2, status = 'published', \
             current_draft_version_id = NULL, updated_at = $3, updated_by = $4 WHERE id = $1",
            self.table()
        );

        sqlx::query(&sql)
            .bind(id.0)
            .bind(version_id.0)
            .bind(updated_at)
            .bind(updated_by.as_ref())
            .execute(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to commit published pointer", e))?;

        Ok(())
    }

    async fn clear_current_draft(&self, id: LabId) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET current_draft_version_id = NULL WHERE id = $1",
            self.table()
        );

        sqlx::query(&sql)
            .bind(id.0)
            .execute(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to clear draft pointer", e))?;

        Ok(())
    }
}

/// Treat `%`, `_` and the escape character itself as literals inside an
/// ILIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_lab(row: &PgRow) -> Result<Lab, StoreError> {
    let corrupt = |column: &str, detail: String| {
        StoreError::Database(format!("corrupt lab column {}: {}", column, detail))
    };

    let slug: String = row
        .try_get("slug")
        .map_err(|e| corrupt("slug", e.to_string()))?;
    let slug = Slug::try_new(slug).map_err(|e| corrupt("slug", e.to_string()))?;

    let status: String = row
        .try_get("status")
        .map_err(|e| corrupt("status", e.to_string()))?;
    let status =
        LabStatus::parse(&status).ok_or_else(|| corrupt("status", status.clone()))?;

    let difficulty: Option<String> = row
        .try_get("difficulty")
        .map_err(|e| corrupt("difficulty", e.to_string()))?;
    let difficulty = difficulty
        .map(|d| Difficulty::parse(&d).ok_or_else(|| corrupt("difficulty", d.clone())))
        .transpose()?;

    let created_by: String = row
        .try_get("created_by")
        .map_err(|e| corrupt("created_by", e.to_string()))?;
    let updated_by: String = row
        .try_get("updated_by")
        .map_err(|e| corrupt("updated_by", e.to_string()))?;
    let archived_by: Option<String> = row
        .try_get("archived_by")
        .map_err(|e| corrupt("archived_by", e.to_string()))?;

    let tags: Json<Vec<String>> = row
        .try_get("tags")
        .map_err(|e| corrupt("tags", e.to_string()))?;

    Ok(Lab {
        id: LabId(row.try_get::<Uuid, _>("id").map_err(|e| corrupt("id", e.to_string()))?),
        workshop_id: WorkshopId(
            row.try_get::<Uuid, _>("workshop_id")
                .map_err(|e| corrupt("workshop_id", e.to_string()))?,
        ),
        workshop_document_group_id: row
            .try_get::<Option<Uuid>, _>("workshop_document_group_id")
            .map_err(|e| corrupt("workshop_document_group_id", e.to_string()))?
            .map(DocumentGroupId),
        slug,
        title: row
            .try_get("title")
            .map_err(|e| corrupt("title", e.to_string()))?,
        summary: row
            .try_get("summary")
            .map_err(|e| corrupt("summary", e.to_string()))?,
        tags: tags.0,
        difficulty,
        estimated_minutes: row
            .try_get("estimated_minutes")
            .map_err(|e| corrupt("estimated_minutes", e.to_string()))?,
        status,
        current_draft_version_id: row
            .try_get::<Option<Uuid>, _>("current_draft_version_id")
            .map_err(|e| corrupt("current_draft_version_id", e.to_string()))?
            .map(VersionId),
        latest_published_version_id: row
            .try_get::<Option<Uuid>, _>("latest_published_version_id")
            .map_err(|e| corrupt("latest_published_version_id", e.to_string()))?
            .map(VersionId),
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt("created_at", e.to_string()))?,
        created_by: ActorId::try_new(created_by).map_err(|e| corrupt("created_by", e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| corrupt("updated_at", e.to_string()))?,
        updated_by: ActorId::try_new(updated_by).map_err(|e| corrupt("updated_by", e.to_string()))?,
        archived_at: row
            .try_get("archived_at")
            .map_err(|e| corrupt("archived_at", e.to_string()))?,
        archived_by: archived_by
            .map(|a| ActorId::try_new(a).map_err(|e| corrupt("archived_by", e.to_string())))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn search_terms_with_pattern_characters_match_literally() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("two-sum"), "two-sum");
    }
}
