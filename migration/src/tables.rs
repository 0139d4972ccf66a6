use labs_common::{
    LAB_EMBEDS_TABLE, LAB_SLUG_CONSTRAINT, LAB_VERSIONS_TABLE, LABS_TABLE,
    VERSION_NUMBER_CONSTRAINT,
};

/// One table the service owns, with the DDL that creates it from scratch.
pub struct TableDefinition {
    pub name: &'static str,
    pub ddls: Vec<String>,
}

/// Full schema in creation order.
pub fn table_definitions(schema: &str) -> Vec<TableDefinition> {
    vec![
        TableDefinition {
            name: LABS_TABLE,
            ddls: labs_ddl(schema),
        },
        TableDefinition {
            name: LAB_VERSIONS_TABLE,
            ddls: lab_versions_ddl(schema),
        },
        TableDefinition {
            name: LAB_EMBEDS_TABLE,
            ddls: lab_embeds_ddl(schema),
        },
    ]
}

fn labs_ddl(schema: &str) -> Vec<String> {
    vec![
        format!(
            r#"CREATE TABLE "{schema}"."{LABS_TABLE}" (
    id UUID PRIMARY KEY,
    workshop_id UUID NOT NULL,
    workshop_document_group_id UUID,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    summary TEXT,
    tags JSONB NOT NULL DEFAULT '[]'::jsonb,
    difficulty TEXT,
    estimated_minutes INTEGER,
    status TEXT NOT NULL,
    current_draft_version_id UUID,
    latest_published_version_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    created_by TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    updated_by TEXT NOT NULL,
    archived_at TIMESTAMPTZ,
    archived_by TEXT,
    CONSTRAINT {LAB_SLUG_CONSTRAINT} UNIQUE (workshop_id, slug)
)"#
        ),
        format!(
            r#"CREATE INDEX "{LABS_TABLE}_workshop_id_status_idx" ON "{schema}"."{LABS_TABLE}" (workshop_id, status)"#
        ),
        format!(
            r#"CREATE INDEX "{LABS_TABLE}_updated_at_idx" ON "{schema}"."{LABS_TABLE}" (updated_at DESC)"#
        ),
    ]
}

fn lab_versions_ddl(schema: &str) -> Vec<String> {
    vec![
        format!(
            r#"CREATE TABLE "{schema}"."{LAB_VERSIONS_TABLE}" (
    id UUID PRIMARY KEY,
    lab_id UUID NOT NULL REFERENCES "{schema}"."{LABS_TABLE}" (id) ON DELETE CASCADE,
    version_number INTEGER NOT NULL,
    is_draft BOOLEAN NOT NULL,
    language TEXT NOT NULL,
    prompt_markdown TEXT NOT NULL,
    hints JSONB NOT NULL DEFAULT '[]'::jsonb,
    starter_code TEXT NOT NULL,
    reference_solution JSONB,
    sample_tests JSONB NOT NULL,
    hidden_tests JSONB NOT NULL,
    runner JSONB NOT NULL,
    content_hash TEXT,
    published_at TIMESTAMPTZ,
    published_by TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    created_by TEXT NOT NULL,
    CONSTRAINT {VERSION_NUMBER_CONSTRAINT} UNIQUE (lab_id, version_number)
)"#
        ),
        format!(
            r#"CREATE INDEX "{LAB_VERSIONS_TABLE}_lab_id_is_draft_idx" ON "{schema}"."{LAB_VERSIONS_TABLE}" (lab_id, is_draft)"#
        ),
    ]
}

fn lab_embeds_ddl(schema: &str) -> Vec<String> {
    vec![
        format!(
            r#"CREATE TABLE "{schema}"."{LAB_EMBEDS_TABLE}" (
    id UUID PRIMARY KEY,
    lab_id UUID NOT NULL REFERENCES "{schema}"."{LABS_TABLE}" (id) ON DELETE CASCADE,
    workshop_id UUID NOT NULL,
    workshop_document_id UUID NOT NULL,
    block_id TEXT NOT NULL,
    block_type TEXT NOT NULL,
    pinned_version_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    created_by TEXT NOT NULL
)"#
        ),
        format!(
            r#"CREATE INDEX "{LAB_EMBEDS_TABLE}_workshop_document_id_idx" ON "{schema}"."{LAB_EMBEDS_TABLE}" (workshop_document_id)"#
        ),
    ]
}
