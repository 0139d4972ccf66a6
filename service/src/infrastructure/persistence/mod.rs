use crate::domain::store::StoreError;

pub mod embeds;
pub mod labs;
pub mod versions;

pub use embeds::PostgresEmbedStore;
pub use labs::PostgresLabStore;
pub use versions::PostgresLabVersionStore;

pub(crate) fn database_error(context: &'static str, error: sqlx::Error) -> StoreError {
    StoreError::Database(format!("{}: {}", context, error))
}

/// Distinguish a unique-constraint violation from other engine failures so
/// callers can react to the conflict instead of treating it as an outage.
pub(crate) fn classify_write_error(
    context: &'static str,
    conflict_message: &str,
    error: sqlx::Error,
) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(conflict_message.to_owned())
        }
        _ => database_error(context, error),
    }
}
