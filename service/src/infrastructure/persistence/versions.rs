use chrono::{DateTime, Utc};
use labs_common::{
    ActorId, LAB_VERSIONS_TABLE, LabId, LabLanguage, ReferenceSolution, RunnerConfig, TestCase,
    VersionId, database::Database,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{
    store::{LabVersionStore, StoreError},
    version::{LabVersion, VersionContent},
};
use crate::infrastructure::persistence::{classify_write_error, database_error};

pub const VERSION_NUMBER_CONFLICT_MSG: &str =
    "version number already taken for this lab";

const VERSION_COLUMNS: &str = "id, lab_id, version_number, is_draft, language, prompt_markdown, \
     hints, starter_code, reference_solution, sample_tests, hidden_tests, runner, content_hash, \
     published_at, published_by, created_at, created_by";

#[derive(Clone)]
pub struct PostgresLabVersionStore {
    database: &'static Database,
}

impl PostgresLabVersionStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn table(&self) -> String {
        format!("{}.{}", self.database.database_schema(), LAB_VERSIONS_TABLE)
    }

    async fn fetch_first(&self, sql: &str, lab_id: LabId) -> Result<Option<LabVersion>, StoreError> {
        let row = sqlx::query(sql)
            .bind(lab_id.0)
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to load lab version", e))?;

        row.map(|row| row_to_version(&row)).transpose()
    }
}

impl LabVersionStore for PostgresLabVersionStore {
    async fn insert(&self, version: LabVersion) -> Result<LabVersion, StoreError> {
        let sql = format!(
            "INSERT INTO {} ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            self.table(),
            VERSION_COLUMNS
        );

        sqlx::query(&sql)
            .bind(version.id.0)
            .bind(version.lab_id.0)
            .bind(version.version_number)
            .bind(version.is_draft)
            .bind(version.content.language.as_str())
            .bind(&version.content.prompt_markdown)
            .bind(Json(&version.content.hints))
            .bind(&version.content.starter_code)
            .bind(version.content.reference_solution.as_ref().map(Json))
            .bind(Json(&version.content.sample_tests))
            .bind(Json(&version.content.hidden_tests))
            .bind(Json(&version.content.runner))
            .bind(&version.content.content_hash)
            .bind(version.published_at)
            .bind(version.published_by.as_ref().map(|a| a.as_ref().to_owned()))
            .bind(version.created_at)
            .bind(version.created_by.as_ref())
            .execute(self.database.database_pool())
            .await
            .map_err(|e| {
                classify_write_error("failed to insert lab version", VERSION_NUMBER_CONFLICT_MSG, e)
            })?;

        Ok(version)
    }

    async fn find(&self, lab_id: LabId, id: VersionId) -> Result<Option<LabVersion>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE lab_id = $1 AND id = $2",
            VERSION_COLUMNS,
            self.table()
        );

        let row = sqlx::query(&sql)
            .bind(lab_id.0)
            .bind(id.0)
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to load lab version", e))?;

        row.map(|row| row_to_version(&row)).transpose()
    }

    async fn latest(&self, lab_id: LabId) -> Result<Option<LabVersion>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE lab_id = $1 ORDER BY version_number DESC LIMIT 1",
            VERSION_COLUMNS,
            self.table()
        );
        self.fetch_first(&sql, lab_id).await
    }

    async fn latest_published(&self, lab_id: LabId) -> Result<Option<LabVersion>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE lab_id = $1 AND is_draft = FALSE \
             ORDER BY published_at DESC, version_number DESC LIMIT 1",
            VERSION_COLUMNS,
            self.table()
        );
        self.fetch_first(&sql, lab_id).await
    }

    async fn list(&self, lab_id: LabId) -> Result<Vec<LabVersion>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE lab_id = $1 ORDER BY version_number DESC",
            VERSION_COLUMNS,
            self.table()
        );

        let rows = sqlx::query(&sql)
            .bind(lab_id.0)
            .fetch_all(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to list lab versions", e))?;

        rows.iter().map(row_to_version).collect()
    }

    async fn mark_published(
        &self,
        lab_id: LabId,
        id: VersionId,
        published_by: ActorId,
        published_at: DateTime<Utc>,
    ) -> Result<Option<LabVersion>, StoreError> {
        let sql = format!(
            "UPDATE {} SET is_draft = FALSE, published_at = $3, published_by = $4 \
             WHERE lab_id = $1 AND id = $2 RETURNING {}",
            self.table(),
            VERSION_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(lab_id.0)
            .bind(id.0)
            .bind(published_at)
            .bind(published_by.as_ref())
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| database_error("failed to publish lab version", e))?;

        row.map(|row| row_to_version(&row)).transpose()
    }
}

fn row_to_version(row: &PgRow) -> Result<LabVersion, StoreError> {
    let corrupt = |column: &str, detail: String| {
        StoreError::Database(format!("corrupt lab_version column {}: {}", column, detail))
    };

    let language: String = row
        .try_get("language")
        .map_err(|e| corrupt("language", e.to_string()))?;
    let language =
        LabLanguage::parse(&language).ok_or_else(|| corrupt("language", language.clone()))?;

    let hints: Json<Vec<String>> = row
        .try_get("hints")
        .map_err(|e| corrupt("hints", e.to_string()))?;
    let reference_solution: Option<Json<ReferenceSolution>> = row
        .try_get("reference_solution")
        .map_err(|e| corrupt("reference_solution", e.to_string()))?;
    let sample_tests: Json<Vec<TestCase>> = row
        .try_get("sample_tests")
        .map_err(|e| corrupt("sample_tests", e.to_string()))?;
    let hidden_tests: Json<Vec<TestCase>> = row
        .try_get("hidden_tests")
        .map_err(|e| corrupt("hidden_tests", e.to_string()))?;
    let runner: Json<RunnerConfig> = row
        .try_get("runner")
        .map_err(|e| corrupt("runner", e.to_string()))?;

    let created_by: String = row
        .try_get("created_by")
        .map_err(|e| corrupt("created_by", e.to_string()))?;
    let published_by: Option<String> = row
        .try_get("published_by")
        .map_err(|e| corrupt("published_by", e.to_string()))?;

    Ok(LabVersion {
        id: VersionId(row.try_get::<Uuid, _>("id").map_err(|e| corrupt("id", e.to_string()))?),
        lab_id: LabId(
            row.try_get::<Uuid, _>("lab_id")
                .map_err(|e| corrupt("lab_id", e.to_string()))?,
        ),
        version_number: row
            .try_get("version_number")
            .map_err(|e| corrupt("version_number", e.to_string()))?,
        is_draft: row
            .try_get("is_draft")
            .map_err(|e| corrupt("is_draft", e.to_string()))?,
        content: VersionContent {
            language,
            prompt_markdown: row
                .try_get("prompt_markdown")
                .map_err(|e| corrupt("prompt_markdown", e.to_string()))?,
            hints: hints.0,
            starter_code: row
                .try_get("starter_code")
                .map_err(|e| corrupt("starter_code", e.to_string()))?,
            reference_solution: reference_solution.map(|r| r.0),
            sample_tests: sample_tests.0,
            hidden_tests: hidden_tests.0,
            runner: runner.0,
            content_hash: row
                .try_get("content_hash")
                .map_err(|e| corrupt("content_hash", e.to_string()))?,
        },
        published_at: row
            .try_get("published_at")
            .map_err(|e| corrupt("published_at", e.to_string()))?,
        published_by: published_by
            .map(|a| ActorId::try_new(a).map_err(|e| corrupt("published_by", e.to_string())))
            .transpose()?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt("created_at", e.to_string()))?,
        created_by: ActorId::try_new(created_by)
            .map_err(|e| corrupt("created_by", e.to_string()))?,
    })
}
