use labs_common::{
    ActorId, EmbedId, LAB_EMBEDS_TABLE, LabId, VersionId, WorkshopDocumentId, WorkshopId,
    database::Database,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::domain::{
    embed::{EmbedFilter, LabEmbed},
    store::{EmbedStore, StoreError},
};
use crate::infrastructure::persistence::database_error;

const EMBED_COLUMNS: &str = "id, lab_id, workshop_id, workshop_document_id, block_id, \
     block_type, pinned_version_id, created_at, created_by";

#[derive(Clone)]
pub struct PostgresEmbedStore {
    database: &'static Database,
}

impl PostgresEmbedStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn table(&self) -> String {
        format!("{}.{}", self.database.database_schema(), LAB_EMBEDS_TABLE)
    }
}

impl EmbedStore for PostgresEmbedStore {
    async fn insert(&self, embed: LabEmbed) -> Result<LabEmbed, StoreError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            self.table(),
            EMBED_COLUMNS
        );

        sqlx::query(&sql)
            .bind(embed.id.0)
            .bind(embed.lab_id.0)
            .bind(embed.workshop_id.0)
            .bind(embed.workshop_document_id.0)
            .bind(&embed.block_id)
            .bind(&embed.block_type)
            .bind(embed.pinned_version_id.map(|id| id.0))
            .bind(embed.created_at)
            .bind(embed.created_by.as_ref())
            .execute(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to insert embed", e))?;

        Ok(embed)
    }

    async fn list(&self, filter: EmbedFilter) -> Result<Vec<LabEmbed>, StoreError> {
        let mut sql = format!("SELECT {} FROM {} WHERE TRUE", EMBED_COLUMNS, self.table());
        let mut next_param = 1;

        for (present, column) in [
            (filter.lab_id.is_some(), "lab_id"),
            (filter.workshop_id.is_some(), "workshop_id"),
            (filter.workshop_document_id.is_some(), "workshop_document_id"),
        ] {
            if present {
                sql.push_str(&format!(" AND {} = ${}", column, next_param));
                next_param += 1;
            }
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(lab_id) = filter.lab_id {
            query = query.bind(lab_id.0);
        }
        if let Some(workshop_id) = filter.workshop_id {
            query = query.bind(workshop_id.0);
        }
        if let Some(document_id) = filter.workshop_document_id {
            query = query.bind(document_id.0);
        }

        let rows = query
            .fetch_all(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to list embeds", e))?;

        rows.iter().map(row_to_embed).collect()
    }

    async fn remove(&self, id: EmbedId) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table());

        let result = sqlx::query(&sql)
            .bind(id.0)
            .execute(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to delete embed", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_embed(row: &PgRow) -> Result<LabEmbed, StoreError> {
    let corrupt = |column: &str, detail: String| {
        StoreError::Database(format!("corrupt lab_embed column {}: {}", column, detail))
    };

    let created_by: String = row
        .try_get("created_by")
        .map_err(|e| corrupt("created_by", e.to_string()))?;

    Ok(LabEmbed {
        id: EmbedId(row.try_get::<Uuid, _>("id").map_err(|e| corrupt("id", e.to_string()))?),
        lab_id: LabId(
            row.try_get::<Uuid, _>("lab_id")
                .map_err(|e| corrupt("lab_id", e.to_string()))?,
        ),
        workshop_id: WorkshopId(
            row.try_get::<Uuid, _>("workshop_id")
                .map_err(|e| corrupt("workshop_id", e.to_string()))?,
        ),
        workshop_document_id: WorkshopDocumentId(
            row.try_get::<Uuid, _>("workshop_document_id")
                .map_err(|e| corrupt("workshop_document_id", e.to_string()))?,
        ),
        block_id: row
            .try_get("block_id")
            .map_err(|e| corrupt("block_id", e.to_string()))?,
        block_type: row
            .try_get("block_type")
            .map_err(|e| corrupt("block_type", e.to_string()))?,
        pinned_version_id: row
            .try_get::<Option<Uuid>, _>("pinned_version_id")
            .map_err(|e| corrupt("pinned_version_id", e.to_string()))?
            .map(VersionId),
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt("created_at", e.to_string()))?,
        created_by: ActorId::try_new(created_by)
            .map_err(|e| corrupt("created_by", e.to_string()))?,
    })
}
