use chrono::{DateTime, Utc};
use labs_common::{
    ActorId, LabId, LabLanguage, ReferenceSolution, RunnerConfig, TestCase, VersionId,
};

/// One content snapshot of a lab. Snapshots are append-only: a draft is
/// superseded by inserting a new record, and publication flips `is_draft`
/// in place, after which the content fields are frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct LabVersion {
    pub id: VersionId,
    pub lab_id: LabId,
    /// Positive, contiguous per lab, starting at 1.
    pub version_number: i32,
    pub is_draft: bool,
    pub content: VersionContent,
    pub published_at: Option<DateTime<Utc>>,
    pub published_by: Option<ActorId>,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionContent {
    pub language: LabLanguage,
    pub prompt_markdown: String,
    pub hints: Vec<String>,
    pub starter_code: String,
    pub reference_solution: Option<ReferenceSolution>,
    /// Visible to learners.
    pub sample_tests: Vec<TestCase>,
    /// Only used on submit/publish validation.
    pub hidden_tests: Vec<TestCase>,
    pub runner: RunnerConfig,
    pub content_hash: Option<String>,
}

/// Content fields offered for a new draft. All optional; absent fields are
/// resolved from the inheritance source by the lifecycle.
#[derive(Debug, Clone)]
pub struct DraftPayload {
    pub language: Option<LabLanguage>,
    pub prompt_markdown: Option<String>,
    pub hints: Option<Vec<String>>,
    pub starter_code: Option<String>,
    pub reference_solution: Option<ReferenceSolution>,
    pub sample_tests: Option<Vec<TestCase>>,
    pub hidden_tests: Option<Vec<TestCase>>,
    pub runner: Option<RunnerConfig>,
    pub content_hash: Option<String>,
    pub created_by: ActorId,
}

impl DraftPayload {
    pub fn empty(created_by: ActorId) -> Self {
        DraftPayload {
            language: None,
            prompt_markdown: None,
            hints: None,
            starter_code: None,
            reference_solution: None,
            sample_tests: None,
            hidden_tests: None,
            runner: None,
            content_hash: None,
            created_by,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishPayload {
    pub published_by: ActorId,
    pub notes: Option<String>,
}
