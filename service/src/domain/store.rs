use std::future::Future;

use chrono::{DateTime, Utc};
use labs_common::{ActorId, EmbedId, LabId, VersionId};

use crate::domain::{
    embed::{EmbedFilter, LabEmbed},
    lab::{Lab, LabFilter, LabUpdate},
    version::LabVersion,
};

/// Failures surfaced by a store. Unique-constraint violations are
/// distinguished from other engine failures so callers can retry or report
/// a conflict instead of a generic storage error.
#[derive(Debug)]
pub enum StoreError {
    Conflict(String),
    Database(String),
}

/// Persistence abstraction for the lab aggregate.
pub trait LabStore: Clone + Send + Sync + 'static {
    fn insert(&self, lab: Lab) -> impl Future<Output = Result<Lab, StoreError>> + Send;

    fn find(&self, id: LabId) -> impl Future<Output = Result<Option<Lab>, StoreError>> + Send;

    fn exists(&self, id: LabId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn list(&self, filter: LabFilter)
    -> impl Future<Output = Result<Vec<Lab>, StoreError>> + Send;

    fn update_meta(
        &self,
        id: LabId,
        update: LabUpdate,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Lab>, StoreError>> + Send;

    fn archive(
        &self,
        id: LabId,
        archived_by: ActorId,
        archived_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Lab>, StoreError>> + Send;

    /// Point the lab at a freshly inserted draft.
    fn set_current_draft(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Commit the lab side of a publication: latest-published pointer,
    /// status, audit fields, and removal of the current-draft pointer.
    fn set_published(
        &self,
        id: LabId,
        version_id: VersionId,
        updated_by: ActorId,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn clear_current_draft(
        &self,
        id: LabId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Persistence abstraction for version snapshots.
pub trait LabVersionStore: Clone + Send + Sync + 'static {
    /// Insert a new snapshot. Implementations must surface a duplicate
    /// `(lab_id, version_number)` as `StoreError::Conflict`.
    fn insert(
        &self,
        version: LabVersion,
    ) -> impl Future<Output = Result<LabVersion, StoreError>> + Send;

    fn find(
        &self,
        lab_id: LabId,
        id: VersionId,
    ) -> impl Future<Output = Result<Option<LabVersion>, StoreError>> + Send;

    /// Highest-numbered version of the lab, draft or published.
    fn latest(
        &self,
        lab_id: LabId,
    ) -> impl Future<Output = Result<Option<LabVersion>, StoreError>> + Send;

    /// Most recently published version, by publish time. Version numbers do
    /// not order publications: an older draft may be published after a newer
    /// one.
    fn latest_published(
        &self,
        lab_id: LabId,
    ) -> impl Future<Output = Result<Option<LabVersion>, StoreError>> + Send;

    /// All versions of the lab, ordered by version number descending.
    fn list(
        &self,
        lab_id: LabId,
    ) -> impl Future<Output = Result<Vec<LabVersion>, StoreError>> + Send;

    /// In-place draft-to-published transition. Content fields are untouched.
    fn mark_published(
        &self,
        lab_id: LabId,
        id: VersionId,
        published_by: ActorId,
        published_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<LabVersion>, StoreError>> + Send;
}

/// Persistence abstraction for embed references (CRUD only).
pub trait EmbedStore: Clone + Send + Sync + 'static {
    fn insert(
        &self,
        embed: LabEmbed,
    ) -> impl Future<Output = Result<LabEmbed, StoreError>> + Send;

    /// Ordered by creation time descending.
    fn list(
        &self,
        filter: EmbedFilter,
    ) -> impl Future<Output = Result<Vec<LabEmbed>, StoreError>> + Send;

    /// Returns whether a record was removed.
    fn remove(&self, id: EmbedId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
