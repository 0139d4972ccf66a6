pub mod database;
mod domain;
pub mod test_utils;

// Persisted table names, shared by the migration binary and the store adapters

pub const LABS_TABLE: &'static str = "labs";
pub const LAB_VERSIONS_TABLE: &'static str = "lab_versions";
pub const LAB_EMBEDS_TABLE: &'static str = "lab_embeds";

// Named unique constraints backing slug and version-number uniqueness

pub const LAB_SLUG_CONSTRAINT: &'static str = "labs_workshop_id_slug_key";
pub const VERSION_NUMBER_CONSTRAINT: &'static str = "lab_versions_lab_id_version_number_key";

// expose domain module

pub use domain::*;
