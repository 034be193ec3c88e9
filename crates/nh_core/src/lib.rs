pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod storage;
pub mod synthetic;
pub mod types;

pub use config::{Config, Routing, StorageKind};
pub use error::Error;
pub use identity::{IdentityResolver, UnverifiedClaims};
pub use models::{InferenceModel, NewsProvider};
pub use storage::{PreferenceStore, SavedArticleStore};
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
