use std::sync::Arc;

use nh_core::{PreferenceStore, Result, SavedArticleStore, StorageKind};
use tracing::info;

pub mod backends;

pub use backends::*;

/// The two repositories the server needs, backed by one datastore.
#[derive(Clone)]
pub struct Storage {
    pub saved: Arc<dyn SavedArticleStore>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Storage {
    pub fn in_memory() -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        Self {
            saved: storage.clone(),
            preferences: storage,
        }
    }
}

pub async fn create_storage(kind: StorageKind, database_url: &str) -> Result<Storage> {
    match kind {
        StorageKind::Memory => {
            info!("Using in-memory storage");
            Ok(Storage::in_memory())
        }
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => {
            info!("Using SQLite storage at {}", database_url);
            let storage = Arc::new(SqliteStorage::connect(database_url).await?);
            Ok(Storage {
                saved: storage.clone(),
                preferences: storage,
            })
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => Err(nh_core::Error::Config(format!(
            "SQLite storage ({}) requires building nh_storage with the `sqlite` feature",
            database_url
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, Storage};
}
