use chrono::Utc;
use labs_common::{ActorId, LabId, LabStatus, VersionId, normalize_test_cases};

use crate::domain::{
    lab::Lab,
    store::{LabStore, LabVersionStore, StoreError},
    version::{DraftPayload, LabVersion, PublishPayload, VersionContent},
};

pub const INCOMPLETE_DRAFT_MSG: &str =
    "Draft content is incomplete. Provide content fields or publish at least one version first.";
pub const IMMUTABLE_MSG: &str = "Published versions are immutable";
pub const ALREADY_PUBLISHED_MSG: &str = "Version is already published";
pub const SAMPLE_TESTS_MSG: &str = "At least one sample test is required before publishing";
pub const TIMEOUT_BOUNDS_MSG: &str = "runner.timeoutMs must be between 100 and 300000";

/// How often a draft insert is retried when a concurrent writer takes the
/// computed version number first.
const NUMBERING_RETRIES: u32 = 3;

#[derive(Debug)]
pub enum LifecycleError {
    NotFound(String),
    InvalidRequest(String),
    Conflict(String),
    Storage(String),
}

impl From<StoreError> for LifecycleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(cause) => LifecycleError::Conflict(cause),
            StoreError::Database(cause) => LifecycleError::Storage(cause),
        }
    }
}

fn lab_not_found(lab_id: LabId) -> LifecycleError {
    LifecycleError::NotFound(format!("Lab \"{}\" not found", lab_id))
}

fn version_not_found(lab_id: LabId, version_id: VersionId) -> LifecycleError {
    LifecycleError::NotFound(format!(
        "Version \"{}\" not found for lab \"{}\"",
        version_id, lab_id
    ))
}

/// Orchestrates draft creation, draft supersession and publication. The only
/// component holding business rules; everything else reads through it.
#[derive(Clone)]
pub struct VersionLifecycle<L, V> {
    labs: L,
    versions: V,
}

impl<L: LabStore, V: LabVersionStore> VersionLifecycle<L, V> {
    pub fn new(labs: L, versions: V) -> Self {
        Self { labs, versions }
    }

    /// Create a new draft snapshot. Fields absent from the payload are
    /// inherited from the latest published version; if neither side provides
    /// the required content the request is rejected.
    pub async fn create_draft(
        &self,
        lab_id: LabId,
        payload: DraftPayload,
    ) -> Result<LabVersion, LifecycleError> {
        self.load_lab(lab_id).await?;

        let source = self.versions.latest_published(lab_id).await?;
        let created_by = payload.created_by.clone();
        let content = resolve_content(payload, source.as_ref().map(|v| &v.content))?;

        self.insert_draft(lab_id, content, created_by).await
    }

    /// Supersede an existing draft. Absent payload fields fall back to the
    /// draft being patched, not to the latest published version, and no
    /// completeness check is repeated here; an incomplete draft surfaces at
    /// publish time.
    pub async fn patch_draft(
        &self,
        lab_id: LabId,
        version_id: VersionId,
        payload: DraftPayload,
    ) -> Result<LabVersion, LifecycleError> {
        self.load_lab(lab_id).await?;

        let current = self
            .versions
            .find(lab_id, version_id)
            .await?
            .ok_or_else(|| version_not_found(lab_id, version_id))?;
        if !current.is_draft {
            return Err(LifecycleError::InvalidRequest(IMMUTABLE_MSG.to_owned()));
        }

        let created_by = payload.created_by.clone();
        let content = resolve_content(payload, Some(&current.content))?;

        self.insert_draft(lab_id, content, created_by).await
    }

    /// Validate a draft and promote it. The version record transitions in
    /// place; the lab record follows with its pointer update.
    pub async fn publish(
        &self,
        lab_id: LabId,
        version_id: VersionId,
        payload: PublishPayload,
    ) -> Result<LabVersion, LifecycleError> {
        self.load_lab(lab_id).await?;

        let version = self
            .versions
            .find(lab_id, version_id)
            .await?
            .ok_or_else(|| version_not_found(lab_id, version_id))?;
        if !version.is_draft {
            return Err(LifecycleError::InvalidRequest(ALREADY_PUBLISHED_MSG.to_owned()));
        }
        if version.content.sample_tests.is_empty() {
            return Err(LifecycleError::InvalidRequest(SAMPLE_TESTS_MSG.to_owned()));
        }
        if !version.content.runner.timeout_in_bounds() {
            return Err(LifecycleError::InvalidRequest(TIMEOUT_BOUNDS_MSG.to_owned()));
        }

        let now = Utc::now();
        let published = self
            .versions
            .mark_published(lab_id, version_id, payload.published_by.clone(), now)
            .await?
            .ok_or_else(|| version_not_found(lab_id, version_id))?;
        self.labs
            .set_published(lab_id, version_id, payload.published_by, now)
            .await?;

        if let Some(notes) = payload.notes {
            tracing::debug!(lab = %lab_id, version = %version_id, "publish notes: {}", notes);
        }

        Ok(published)
    }

    /// All versions of the lab, newest number first.
    pub async fn list_versions(&self, lab_id: LabId) -> Result<Vec<LabVersion>, LifecycleError> {
        self.load_lab(lab_id).await?;
        Ok(self.versions.list(lab_id).await?)
    }

    pub async fn get_version(
        &self,
        lab_id: LabId,
        version_id: VersionId,
    ) -> Result<LabVersion, LifecycleError> {
        self.versions
            .find(lab_id, version_id)
            .await?
            .ok_or_else(|| version_not_found(lab_id, version_id))
    }

    async fn load_lab(&self, lab_id: LabId) -> Result<Lab, LifecycleError> {
        let lab = self
            .labs
            .find(lab_id)
            .await?
            .ok_or_else(|| lab_not_found(lab_id))?;
        Ok(self.reconcile(lab).await?)
    }

    /// The content write and the lab pointer write are two statements; a
    /// crash between them leaves the lab stale. Version records are the
    /// source of truth, so lazily repair the pointers before an operation
    /// proceeds.
    async fn reconcile(&self, mut lab: Lab) -> Result<Lab, StoreError> {
        if let Some(latest) = self.versions.latest_published(lab.id).await? {
            let pointer_stale = lab.latest_published_version_id != Some(latest.id);
            if pointer_stale && lab.status != LabStatus::Archived {
                tracing::warn!(
                    lab = %lab.id,
                    version = %latest.id,
                    "lab pointer behind published version, repairing"
                );
                let updated_by = latest
                    .published_by
                    .clone()
                    .unwrap_or_else(|| lab.updated_by.clone());
                let updated_at = latest.published_at.unwrap_or(latest.created_at);
                self.labs
                    .set_published(lab.id, latest.id, updated_by.clone(), updated_at)
                    .await?;
                lab.latest_published_version_id = Some(latest.id);
                lab.status = LabStatus::Published;
                lab.current_draft_version_id = None;
                lab.updated_by = updated_by;
                lab.updated_at = updated_at;
            }
        }

        if let Some(draft_id) = lab.current_draft_version_id {
            let stale = match self.versions.find(lab.id, draft_id).await? {
                Some(version) => !version.is_draft,
                None => true,
            };
            if stale {
                tracing::warn!(
                    lab = %lab.id,
                    version = %draft_id,
                    "current draft pointer is stale, clearing"
                );
                self.labs.clear_current_draft(lab.id).await?;
                lab.current_draft_version_id = None;
            }
        }

        Ok(lab)
    }

    /// Allocate the next version number and insert the draft. Numbering is a
    /// read followed by a write, so correctness comes from the unique
    /// `(lab_id, version_number)` constraint: on a conflict the number is
    /// recomputed and the insert retried a bounded number of times.
    async fn insert_draft(
        &self,
        lab_id: LabId,
        content: VersionContent,
        created_by: ActorId,
    ) -> Result<LabVersion, LifecycleError> {
        let now = Utc::now();

        for attempt in 1..=NUMBERING_RETRIES {
            let next_number = self
                .versions
                .latest(lab_id)
                .await?
                .map(|v| v.version_number)
                .unwrap_or(0)
                + 1;

            let draft = LabVersion {
                id: VersionId::generate(),
                lab_id,
                version_number: next_number,
                is_draft: true,
                content: content.clone(),
                published_at: None,
                published_by: None,
                created_at: now,
                created_by: created_by.clone(),
            };

            match self.versions.insert(draft).await {
                Ok(saved) => {
                    self.labs
                        .set_current_draft(lab_id, saved.id, created_by, now)
                        .await?;
                    return Ok(saved);
                }
                Err(StoreError::Conflict(cause)) => {
                    tracing::warn!(
                        lab = %lab_id,
                        attempt,
                        number = next_number,
                        "version number already taken, retrying: {}",
                        cause
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LifecycleError::Conflict(format!(
            "could not allocate a version number for lab \"{}\" under concurrent writes",
            lab_id
        )))
    }
}

/// Resolve each content field from the payload, falling back to the
/// inheritance source. Hints default to an empty list; test cases are
/// normalized so every case carries an identity.
fn resolve_content(
    payload: DraftPayload,
    source: Option<&VersionContent>,
) -> Result<VersionContent, LifecycleError> {
    let language = payload.language.or_else(|| source.map(|s| s.language));
    let prompt_markdown = payload
        .prompt_markdown
        .or_else(|| source.map(|s| s.prompt_markdown.clone()));
    let hints = payload
        .hints
        .or_else(|| source.map(|s| s.hints.clone()))
        .unwrap_or_default();
    let starter_code = payload
        .starter_code
        .or_else(|| source.map(|s| s.starter_code.clone()));
    let reference_solution = payload
        .reference_solution
        .or_else(|| source.and_then(|s| s.reference_solution.clone()));
    let sample_tests = normalize_test_cases(
        payload
            .sample_tests
            .or_else(|| source.map(|s| s.sample_tests.clone()))
            .unwrap_or_default(),
    );
    let hidden_tests = normalize_test_cases(
        payload
            .hidden_tests
            .or_else(|| source.map(|s| s.hidden_tests.clone()))
            .unwrap_or_default(),
    );
    let runner = payload.runner.or_else(|| source.map(|s| s.runner.clone()));
    let content_hash = payload
        .content_hash
        .or_else(|| source.and_then(|s| s.content_hash.clone()));

    match (language, prompt_markdown, starter_code, runner) {
        (Some(language), Some(prompt_markdown), Some(starter_code), Some(runner)) => {
            Ok(VersionContent {
                language,
                prompt_markdown,
                hints,
                starter_code,
                reference_solution,
                sample_tests,
                hidden_tests,
                runner,
                content_hash,
            })
        }
        _ => Err(LifecycleError::InvalidRequest(INCOMPLETE_DRAFT_MSG.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;
    use labs_common::test_utils::{actor, io_test, sample_runner, unit_test};
    use labs_common::{LabId, LabLanguage, LabStatus, VersionId};

    use super::*;
    use crate::domain::memory::{MemoryLabs, MemoryVersions, seed_lab};

    fn lifecycle() -> (VersionLifecycle<MemoryLabs, MemoryVersions>, MemoryLabs, MemoryVersions)
    {
        let labs = MemoryLabs::default();
        let versions = MemoryVersions::default();
        (VersionLifecycle::new(labs.clone(), versions.clone()), labs, versions)
    }

    fn full_payload(created_by: &str) -> DraftPayload {
        DraftPayload {
            language: Some(LabLanguage::Javascript),
            prompt_markdown: Some("Find two indices adding up to target.".to_owned()),
            hints: Some(vec!["Use a map".to_owned()]),
            starter_code: Some("function solve(nums, target) {}".to_owned()),
            reference_solution: None,
            sample_tests: Some(vec![io_test("basic")]),
            hidden_tests: Some(vec![unit_test("hidden")]),
            runner: Some(sample_runner(1000)),
            content_hash: None,
            created_by: actor(created_by),
        }
    }

    fn publish_payload(published_by: &str) -> PublishPayload {
        PublishPayload {
            published_by: actor(published_by),
            notes: None,
        }
    }

    #[tokio::test]
    async fn first_draft_gets_number_one_and_moves_the_pointer() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let draft = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();

        assert_eq!(draft.version_number, 1);
        assert!(draft.is_draft);
        assert!(draft.published_at.is_none());
        assert_eq!(
            labs.get(lab_id).unwrap().current_draft_version_id,
            Some(draft.id)
        );
        assert_eq!(labs.get(lab_id).unwrap().updated_by, actor("u1"));
    }

    #[tokio::test]
    async fn create_draft_on_unknown_lab_is_not_found() {
        let (lifecycle, _, _) = lifecycle();

        let err = lifecycle
            .create_draft(LabId::generate(), full_payload("u1"))
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_payload_without_published_version_is_rejected() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let err = lifecycle
            .create_draft(lab_id, DraftPayload::empty(actor("u1")))
            .await
            .unwrap_err();

        match err {
            LifecycleError::InvalidRequest(message) => {
                assert_eq!(message, INCOMPLETE_DRAFT_MSG);
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_payload_inherits_latest_published_content() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v1.id, publish_payload("u2"))
            .await
            .unwrap();

        let draft = lifecycle
            .create_draft(lab_id, DraftPayload::empty(actor("u3")))
            .await
            .unwrap();

        let published = lifecycle.get_version(lab_id, v1.id).await.unwrap();
        assert_eq!(draft.content, published.content);
        assert_eq!(draft.version_number, 2);
        assert!(draft.is_draft);
        assert_eq!(draft.created_by, actor("u3"));
        // Already-normalized test identities are preserved, not regenerated.
        assert_eq!(
            draft.content.sample_tests[0].id(),
            published.content.sample_tests[0].id()
        );
    }

    #[tokio::test]
    async fn patch_falls_back_to_the_current_draft_not_the_published_version() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v1.id, publish_payload("u1"))
            .await
            .unwrap();

        let mut divergent = full_payload("u1");
        divergent.prompt_markdown = Some("Draft-only prompt".to_owned());
        let v2 = lifecycle.create_draft(lab_id, divergent).await.unwrap();

        let mut patch = DraftPayload::empty(actor("u2"));
        patch.starter_code = Some("function solve() { /* new */ }".to_owned());
        let v3 = lifecycle.patch_draft(lab_id, v2.id, patch).await.unwrap();

        assert_eq!(v3.version_number, 3);
        assert_eq!(v3.content.prompt_markdown, "Draft-only prompt");
        assert_eq!(v3.content.starter_code, "function solve() { /* new */ }");
        assert_eq!(
            labs.get(lab_id).unwrap().current_draft_version_id,
            Some(v3.id)
        );
        // The patched draft is superseded, never edited in place.
        let v2_after = lifecycle.get_version(lab_id, v2.id).await.unwrap();
        assert!(v2_after.is_draft);
        assert_eq!(v2_after.content, v2.content);
    }

    #[tokio::test]
    async fn patching_a_published_version_is_rejected_and_inserts_nothing() {
        let (lifecycle, labs, versions) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v1.id, publish_payload("u1"))
            .await
            .unwrap();

        let err = lifecycle
            .patch_draft(lab_id, v1.id, DraftPayload::empty(actor("u2")))
            .await
            .unwrap_err();

        match err {
            LifecycleError::InvalidRequest(message) => assert_eq!(message, IMMUTABLE_MSG),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
        assert_eq!(versions.inner.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn publish_requires_at_least_one_sample_test() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let mut payload = full_payload("u1");
        payload.sample_tests = Some(vec![]);
        let draft = lifecycle.create_draft(lab_id, payload).await.unwrap();

        let err = lifecycle
            .publish(lab_id, draft.id, publish_payload("u2"))
            .await
            .unwrap_err();

        match err {
            LifecycleError::InvalidRequest(message) => assert_eq!(message, SAMPLE_TESTS_MSG),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
        let untouched = lifecycle.get_version(lab_id, draft.id).await.unwrap();
        assert!(untouched.is_draft);
    }

    #[tokio::test]
    async fn publish_requires_timeout_within_bounds() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let mut payload = full_payload("u1");
        payload.runner = Some(sample_runner(99));
        let draft = lifecycle.create_draft(lab_id, payload).await.unwrap();

        let err = lifecycle
            .publish(lab_id, draft.id, publish_payload("u2"))
            .await
            .unwrap_err();

        match err {
            LifecycleError::InvalidRequest(message) => assert_eq!(message, TIMEOUT_BOUNDS_MSG),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_flips_the_version_and_the_lab() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let draft = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        let published = lifecycle
            .publish(lab_id, draft.id, publish_payload("u2"))
            .await
            .unwrap();

        assert!(!published.is_draft);
        assert_eq!(published.published_by, Some(actor("u2")));
        assert!(published.published_at.is_some());
        assert_eq!(published.content, draft.content);

        let lab = labs.get(lab_id).unwrap();
        assert_eq!(lab.latest_published_version_id, Some(draft.id));
        assert_eq!(lab.status, LabStatus::Published);
        assert_eq!(lab.current_draft_version_id, None);
        assert_eq!(lab.updated_by, actor("u2"));
    }

    #[tokio::test]
    async fn publishing_twice_is_rejected() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let draft = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, draft.id, publish_payload("u2"))
            .await
            .unwrap();

        let err = lifecycle
            .publish(lab_id, draft.id, publish_payload("u2"))
            .await
            .unwrap_err();

        match err {
            LifecycleError::InvalidRequest(message) => {
                assert_eq!(message, ALREADY_PUBLISHED_MSG);
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn version_numbers_stay_contiguous() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v1.id, publish_payload("u1"))
            .await
            .unwrap();
        let v2 = lifecycle
            .create_draft(lab_id, DraftPayload::empty(actor("u1")))
            .await
            .unwrap();
        lifecycle
            .patch_draft(lab_id, v2.id, DraftPayload::empty(actor("u1")))
            .await
            .unwrap();
        lifecycle
            .create_draft(lab_id, DraftPayload::empty(actor("u1")))
            .await
            .unwrap();

        let mut numbers: Vec<i32> = lifecycle
            .list_versions(lab_id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn numbering_retries_after_a_conflict() {
        let (lifecycle, labs, versions) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        versions.fail_inserts.store(1, Ordering::SeqCst);
        let draft = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();

        assert_eq!(draft.version_number, 1);
    }

    #[tokio::test]
    async fn numbering_gives_up_after_repeated_conflicts() {
        let (lifecycle, labs, versions) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        versions.fail_inserts.store(10, Ordering::SeqCst);
        let err = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Conflict(_)));
    }

    #[tokio::test]
    async fn stale_published_pointer_is_repaired_on_read() {
        let (lifecycle, labs, versions) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let draft = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        // Simulate a crash between the version write and the lab write.
        versions
            .mark_published(lab_id, draft.id, actor("u2"), Utc::now())
            .await
            .unwrap();
        assert_eq!(labs.get(lab_id).unwrap().status, LabStatus::Draft);

        lifecycle.list_versions(lab_id).await.unwrap();

        let lab = labs.get(lab_id).unwrap();
        assert_eq!(lab.status, LabStatus::Published);
        assert_eq!(lab.latest_published_version_id, Some(draft.id));
        assert_eq!(lab.current_draft_version_id, None);
    }

    #[tokio::test]
    async fn republishing_an_older_draft_survives_later_reads() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        let v2 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v2.id, publish_payload("u2"))
            .await
            .unwrap();
        lifecycle
            .publish(lab_id, v1.id, publish_payload("u3"))
            .await
            .unwrap();

        // A read repairs stale pointers from version records; publish
        // recency, not version number, decides which record wins.
        lifecycle.list_versions(lab_id).await.unwrap();

        let lab = labs.get(lab_id).unwrap();
        assert_eq!(lab.latest_published_version_id, Some(v1.id));
        assert_eq!(lab.status, LabStatus::Published);
        assert_eq!(lab.updated_by, actor("u3"));
    }

    #[tokio::test]
    async fn dangling_draft_pointer_is_cleared_on_read() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        labs.set_current_draft(lab_id, VersionId::generate(), actor("u1"), Utc::now())
            .await
            .unwrap();

        lifecycle.list_versions(lab_id).await.unwrap();

        assert_eq!(labs.get(lab_id).unwrap().current_draft_version_id, None);
    }

    #[tokio::test]
    async fn list_versions_orders_by_number_descending() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let v1 = lifecycle
            .create_draft(lab_id, full_payload("u1"))
            .await
            .unwrap();
        lifecycle
            .patch_draft(lab_id, v1.id, DraftPayload::empty(actor("u1")))
            .await
            .unwrap();

        let listed = lifecycle.list_versions(lab_id).await.unwrap();
        let numbers: Vec<i32> = listed.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2, 1]);

        let err = lifecycle.list_versions(LabId::generate()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    /// The end-to-end scenario: draft, failed publish, patch in a sample
    /// test, publish.
    #[tokio::test]
    async fn draft_patch_publish_round_trip() {
        let (lifecycle, labs, _) = lifecycle();
        let lab_id = seed_lab(&labs).await;

        let mut payload = full_payload("u1");
        payload.sample_tests = None;
        payload.hidden_tests = None;
        payload.hints = None;
        let v1 = lifecycle.create_draft(lab_id, payload).await.unwrap();
        assert_eq!(v1.version_number, 1);
        assert!(v1.is_draft);
        assert_eq!(
            labs.get(lab_id).unwrap().current_draft_version_id,
            Some(v1.id)
        );

        let err = lifecycle
            .publish(lab_id, v1.id, publish_payload("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidRequest(_)));

        let mut patch = DraftPayload::empty(actor("u1"));
        patch.sample_tests = Some(vec![io_test("basic")]);
        let v2 = lifecycle.patch_draft(lab_id, v1.id, patch).await.unwrap();
        assert_eq!(v2.version_number, 2);
        assert_eq!(v2.content.language, v1.content.language);
        assert_eq!(v2.content.prompt_markdown, v1.content.prompt_markdown);
        assert_eq!(v2.content.starter_code, v1.content.starter_code);
        assert_eq!(v2.content.runner, v1.content.runner);

        lifecycle
            .publish(lab_id, v2.id, publish_payload("u2"))
            .await
            .unwrap();

        let lab = labs.get(lab_id).unwrap();
        assert_eq!(lab.latest_published_version_id, Some(v2.id));
        assert_eq!(lab.status, LabStatus::Published);
        assert_eq!(lab.current_draft_version_id, None);
    }
}
