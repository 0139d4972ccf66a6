pub mod embed;
pub mod lab;
pub mod lifecycle;
#[cfg(test)]
pub mod memory;
pub mod store;
pub mod version;

use crate::domain::lifecycle::VersionLifecycle;
use crate::domain::store::{EmbedStore, LabStore, LabVersionStore};

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type Labs: LabStore;
    type Versions: LabVersionStore;
    type Embeds: EmbedStore;

    fn labs(&self) -> &Self::Labs;
    fn embeds(&self) -> &Self::Embeds;
    fn lifecycle(&self) -> &VersionLifecycle<Self::Labs, Self::Versions>;
}
