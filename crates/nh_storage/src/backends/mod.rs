pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Identifier for a new saved-article record.
pub(crate) fn new_saved_id() -> String {
    format!("saved-{}", uuid::Uuid::new_v4().simple())
}
