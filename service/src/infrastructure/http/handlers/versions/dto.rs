use chrono::{DateTime, Utc};
use labs_common::{ActorId, LabLanguage, ReferenceSolution, RunnerConfig, TestCase};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::version::{DraftPayload, LabVersion, PublishPayload};

/// Body of both the create-draft and patch-draft endpoints; every content
/// field is optional and resolved against the inheritance source by the
/// lifecycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftVersionRequest {
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

impl TryFrom<DraftVersionRequest> for DraftPayload {
    type Error = String;

    fn try_from(value: DraftVersionRequest) -> Result<Self, Self::Error> {
        if let Some(runner) = &value.runner {
            runner.validate()?;
        }
        Ok(DraftPayload {
            language: value.language,
            prompt_markdown: value.prompt_markdown,
            hints: value.hints,
            starter_code: value.starter_code,
            reference_solution: value.reference_solution,
            sample_tests: value.sample_tests,
            hidden_tests: value.hidden_tests,
            runner: value.runner,
            content_hash: value.content_hash,
            created_by: value.created_by,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishVersionRequest {
    pub published_by: ActorId,
    pub notes: Option<String>,
}

impl From<PublishVersionRequest> for PublishPayload {
    fn from(value: PublishVersionRequest) -> Self {
        PublishPayload {
            published_by: value.published_by,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub id: Uuid,
    pub lab_id: Uuid,
    pub version_number: i32,
    pub is_draft: bool,
    pub language: LabLanguage,
    pub prompt_markdown: String,
    pub hints: Vec<String>,
    pub starter_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_solution: Option<ReferenceSolution>,
    pub sample_tests: Vec<TestCase>,
    pub hidden_tests: Vec<TestCase>,
    pub runner: RunnerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<LabVersion> for VersionResponse {
    fn from(version: LabVersion) -> Self {
        let content = version.content;
        VersionResponse {
            id: version.id.0,
            lab_id: version.lab_id.0,
            version_number: version.version_number,
            is_draft: version.is_draft,
            language: content.language,
            prompt_markdown: content.prompt_markdown,
            hints: content.hints,
            starter_code: content.starter_code,
            reference_solution: content.reference_solution,
            sample_tests: content.sample_tests,
            hidden_tests: content.hidden_tests,
            runner: content.runner,
            content_hash: content.content_hash,
            published_at: version.published_at,
            published_by: version.published_by.map(|a| a.into_inner()),
            created_at: version.created_at,
            created_by: version.created_by.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use labs_common::test_utils::sample_runner;
    use serde_json::json;

    use super::*;

    #[test]
    fn draft_request_parses_camel_case_fields() {
        let request: DraftVersionRequest = serde_json::from_value(json!({
            "language": "javascript",
            "promptMarkdown": "p",
            "starterCode": "s",
            "runner": { "timeoutMs": 1000 },
            "createdBy": "u1"
        }))
        .unwrap();

        assert_eq!(request.language, Some(LabLanguage::Javascript));
        assert_eq!(request.prompt_markdown.as_deref(), Some("p"));
        assert_eq!(request.starter_code.as_deref(), Some("s"));
        assert_eq!(request.created_by.as_ref(), "u1");
    }

    #[test]
    fn blank_created_by_is_rejected_at_parse_time() {
        let result = serde_json::from_value::<DraftVersionRequest>(json!({
            "createdBy": "  "
        }));
        assert!(result.is_err());
    }

    #[test]
    fn out_of_bounds_runner_is_rejected_at_the_boundary() {
        let mut request: DraftVersionRequest = serde_json::from_value(json!({
            "createdBy": "u1"
        }))
        .unwrap();
        request.runner = Some(sample_runner(99));

        let err = DraftPayload::try_from(request).unwrap_err();
        assert!(err.contains("runner.timeoutMs"));
    }
}
