//! In-memory store implementations backing lifecycle and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use labs_common::test_utils::actor;
use labs_common::{ActorId, EmbedId, LabId, LabStatus, Slug, VersionId, WorkshopId};

use crate::domain::AppState;
use crate::domain::embed::{EmbedFilter, LabEmbed};
use crate::domain::lab::{Lab, LabFilter, LabUpdate, NewLab};
use crate::domain::lifecycle::VersionLifecycle;
use crate::domain::store::{EmbedStore, LabStore, LabVersionStore, StoreError};
use crate::domain::version::LabVersion;

#[derive(Clone, Default)]
pub struct MemoryLabs {
    pub inner: Arc<Mutex<HashMap<LabId, Lab>>>,
}

impl MemoryLabs {
    pub fn get(&self, id: LabId) -> Option<Lab> {
        self.inner.lock().unwrap().get(&id).cloned()
    }
}

impl LabStore for MemoryLabs {
    async fn insert(&self, lab: Lab) -> Result<Lab, StoreError> {
        self.inner.lock().unwrap().insert(lab.id, lab.clone());
        Ok(lab)
    }

    async fn find(&self, id: LabId) -> Result<Option<Lab>, StoreError> {
        Ok(self.get(id))
    }

    async fn exists(&self, id: LabId) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().contains_key(&id))
    }

    async fn list(&self, _filter: LabFilter) -> Result<Vec<Lab>, StoreError> {
        Ok(self.inner.lock().unwrap().values().cloned().collect())
    }

    async fn update_meta(
        &self,
        id: LabId,
        update: LabUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Lab>, StoreError> {
        let mut labs = self.inner.lock().unwrap();
        let Some(lab) = labs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            lab.title = title;
        }
        lab.updated_at = updated_at;
        Ok(Some(lab.clone()))
    }

    async fn archive(
        &self,
        id: LabId,
        archived_by: ActorId,
        archived_at: DateTime<Utc>,
    ) -> Result<Option<Lab>, StoreError> {
        let mut labs = self.inner.lock().unwrap();
        let Some(lab) = labs.get_mut(&id) else {
            return Ok(None);
        };
        lab.status = LabStatus::Archived;
        lab.archived_at = Some(archived_at);
        lab.archived_by = Some(archived_by.clone());
        lab.updated_at = archived_at;
        lab.updated_by = archived_by;
        Ok(Some(lab.clone()))
    }

    async fn set_current_draft(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut labs = self.inner.lock().unwrap();
        if let Some(lab) = labs.get_mut(&id) {
            lab.current_draft_version_id = Some(version_id);
            lab.updated_at = updated_at;
            lab.updated_by = updated_by;
        }
        Ok(())
    }

    async fn set_published(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut labs = self.inner.lock().unwrap();
        if let Some(lab) = labs.get_mut(&id) {
            lab.latest_published_version_id = Some(version_id);
            lab.status = LabStatus::Published;
            lab.current_draft_version_id = None;
            lab.updated_at = updated_at;
            lab.updated_by = updated_by;
        }
        Ok(())
    }

    async fn clear_current_draft(&self, id: LabId) -> Result<(), StoreError> {
        let mut labs = self.inner.lock().unwrap();
        if let Some(lab) = labs.get_mut(&id) {
            lab.current_draft_version_id = None;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryVersions {
    pub inner: Arc<Mutex<Vec<LabVersion>>>,
    /// Number of upcoming inserts that fail with a simulated unique
    /// violation, to exercise the numbering retry.
    pub fail_inserts: Arc<AtomicUsize>,
}

impl LabVersionStore for MemoryVersions {
    async fn insert(&self, version: LabVersion) -> Result<LabVersion, StoreError> {
        if self
            .fail_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Conflict("duplicate version number".to_owned()));
        }

        let mut versions = self.inner.lock().unwrap();
        let duplicate = versions
            .iter()
            .any(|v| v.lab_id == version.lab_id && v.version_number == version.version_number);
        if duplicate {
            return Err(StoreError::Conflict("duplicate version number".to_owned()));
        }
        versions.push(version.clone());
        Ok(version)
    }

    async fn find(&self, lab_id: LabId, id: VersionId) -> Result<Option<LabVersion>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.lab_id == lab_id && v.id == id)
            .cloned())
    }

    async fn latest(&self, lab_id: LabId) -> Result<Option<LabVersion>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.lab_id == lab_id)
            .max_by_key(|v| v.version_number)
            .cloned())
    }

    async fn latest_published(&self, lab_id: LabId) -> Result<Option<LabVersion>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.lab_id == lab_id && !v.is_draft)
            .max_by_key(|v| (v.published_at, v.version_number))
            .cloned())
    }

    async fn list(&self, lab_id: LabId) -> Result<Vec<LabVersion>, StoreError> {
        let mut versions: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.lab_id == lab_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn mark_published(
        &self,
        lab_id: LabId,
        id: VersionId,
        published_by: ActorId,
        published_at: DateTime<Utc>,
    ) -> Result<Option<LabVersion>, StoreError> {
        let mut versions = self.inner.lock().unwrap();
        let Some(version) = versions
            .iter_mut()
            .find(|v| v.lab_id == lab_id && v.id == id)
        else {
            return Ok(None);
        };
        version.is_draft = false;
        version.published_at = Some(published_at);
        version.published_by = Some(published_by);
        Ok(Some(version.clone()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryEmbeds {
    pub inner: Arc<Mutex<Vec<LabEmbed>>>,
}

impl EmbedStore for MemoryEmbeds {
    async fn insert(&self, embed: LabEmbed) -> Result<LabEmbed, StoreError> {
        self.inner.lock().unwrap().push(embed.clone());
        Ok(embed)
    }

    async fn list(&self, filter: EmbedFilter) -> Result<Vec<LabEmbed>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                filter.lab_id.is_none_or(|id| e.lab_id == id)
                    && filter.workshop_id.is_none_or(|id| e.workshop_id == id)
                    && filter
                        .workshop_document_id
                        .is_none_or(|id| e.workshop_document_id == id)
            })
            .cloned()
            .collect())
    }

    async fn remove(&self, id: EmbedId) -> Result<bool, StoreError> {
        let mut embeds = self.inner.lock().unwrap();
        let before = embeds.len();
        embeds.retain(|e| e.id != id);
        Ok(embeds.len() < before)
    }
}

/// A fully in-memory application state for handler tests.
#[derive(Clone)]
pub struct MemoryState {
    labs: MemoryLabs,
    embeds: MemoryEmbeds,
    lifecycle: VersionLifecycle<MemoryLabs, MemoryVersions>,
}

impl MemoryState {
    pub fn new() -> (Self, MemoryLabs, MemoryVersions) {
        let labs = MemoryLabs::default();
        let versions = MemoryVersions::default();
        let state = MemoryState {
            labs: labs.clone(),
            embeds: MemoryEmbeds::default(),
            lifecycle: VersionLifecycle::new(labs.clone(), versions.clone()),
        };
        (state, labs, versions)
    }
}

impl AppState for MemoryState {
    type Labs = MemoryLabs;
    type Versions = MemoryVersions;
    type Embeds = MemoryEmbeds;

    fn labs(&self) -> &MemoryLabs {
        &self.labs
    }

    fn embeds(&self) -> &MemoryEmbeds {
        &self.embeds
    }

    fn lifecycle(&self) -> &VersionLifecycle<MemoryLabs, MemoryVersions> {
        &self.lifecycle
    }
}

pub async fn seed_lab(labs: &MemoryLabs) -> LabId {
    let lab = Lab::create(
        NewLab {
            workshop_id: WorkshopId::generate(),
            workshop_document_group_id: None,
            slug: Slug::try_new("two-sum").unwrap(),
            title: "Two Sum".to_owned(),
            summary: None,
            tags: vec!["arrays".to_owned()],
            difficulty: None,
            estimated_minutes: Some(20),
            status: LabStatus::Draft,
            created_by: actor("author"),
            updated_by: actor("author"),
        },
        Utc::now(),
    );
    labs.insert(lab.clone()).await.unwrap();
    lab.id
}
