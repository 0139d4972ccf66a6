use crate::domain::AppState;
use crate::domain::lifecycle::VersionLifecycle;
use crate::infrastructure::persistence::{
    PostgresEmbedStore, PostgresLabStore, PostgresLabVersionStore,
};

pub mod http;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl {
    labs: PostgresLabStore,
    embeds: PostgresEmbedStore,
    lifecycle: VersionLifecycle<PostgresLabStore, PostgresLabVersionStore>,
}

impl AppStateImpl {
    pub fn new(
        labs: PostgresLabStore,
        versions: PostgresLabVersionStore,
        embeds: PostgresEmbedStore,
    ) -> Self {
        Self {
            labs: labs.clone(),
            embeds,
            lifecycle: VersionLifecycle::new(labs, versions),
        }
    }
}

impl AppState for AppStateImpl {
    type Labs = PostgresLabStore;
    type Versions = PostgresLabVersionStore;
    type Embeds = PostgresEmbedStore;

    fn labs(&self) -> &Self::Labs {
        &self.labs
    }

    fn embeds(&self) -> &Self::Embeds {
        &self.embeds
    }

    fn lifecycle(&self) -> &VersionLifecycle<Self::Labs, Self::Versions> {
        &self.lifecycle
    }
}
