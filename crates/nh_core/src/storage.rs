use async_trait::async_trait;
use crate::types::{PreferenceSet, SavedArticleRecord};
use crate::Result;

#[async_trait]
pub trait SavedArticleStore: Send + Sync {
    /// Bookmark an article for a user. Saving the same pair twice is a `Duplicate` error.
    async fn save(&self, user_id: &str, article_id: &str) -> Result<SavedArticleRecord>;

    /// Drop a bookmark. Fails with `NotFound` when the pair was never saved.
    async fn remove(&self, user_id: &str, article_id: &str) -> Result<()>;

    /// All bookmarks of a user, oldest first
    async fn list_for(&self, user_id: &str) -> Result<Vec<SavedArticleRecord>>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a user's preferences, creating the initial set on first access
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceSet>;

    /// Replace a user's preferences wholesale
    async fn set_preferences(&self, user_id: &str, preferences: PreferenceSet) -> Result<()>;
}
