use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use nh_core::{
    Error, PreferenceSet, PreferenceStore, Result, SavedArticleRecord, SavedArticleStore,
};

use super::new_saved_id;

#[derive(Default)]
struct MemoryStore {
    saved: HashMap<String, Vec<SavedArticleRecord>>,
    preferences: HashMap<String, PreferenceSet>,
}

impl MemoryStore {
    fn save(&mut self, user_id: &str, article_id: &str) -> Result<SavedArticleRecord> {
        let records = self.saved.entry(user_id.to_string()).or_default();
        if records.iter().any(|r| r.article_id == article_id) {
            return Err(Error::Duplicate("Article already saved".to_string()));
        }

        let record = SavedArticleRecord {
            id: new_saved_id(),
            article_id: article_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    fn remove(&mut self, user_id: &str, article_id: &str) -> Result<()> {
        let records = self
            .saved
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;
        let position = records
            .iter()
            .position(|r| r.article_id == article_id)
            .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;
        records.remove(position);
        if records.is_empty() {
            self.saved.remove(user_id);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.saved.values().map(Vec::len).sum()
    }
}

/// Process-local store. Loses everything on restart; used for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved-article records across all users.
    pub async fn saved_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl SavedArticleStore for InMemoryStorage {
    async fn save(&self, user_id: &str, article_id: &str) -> Result<SavedArticleRecord> {
        let record = self.store.write().await.save(user_id, article_id)?;
        debug!("Saved {} for {} as {}", article_id, user_id, record.id);
        Ok(record)
    }

    async fn remove(&self, user_id: &str, article_id: &str) -> Result<()> {
        self.store.write().await.remove(user_id, article_id)
    }

    async fn list_for(&self, user_id: &str) -> Result<Vec<SavedArticleRecord>> {
        let store = self.store.read().await;
        Ok(store.saved.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStorage {
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceSet> {
        let mut store = self.store.write().await;
        Ok(store
            .preferences
            .entry(user_id.to_string())
            .or_insert_with(PreferenceSet::initial)
            .clone())
    }

    async fn set_preferences(&self, user_id: &str, preferences: PreferenceSet) -> Result<()> {
        self.store
            .write()
            .await
            .preferences
            .insert(user_id.to_string(), preferences);
        Ok(())
    }
}
