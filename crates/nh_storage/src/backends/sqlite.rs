use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use nh_core::{
    Error, PreferenceSet, PreferenceStore, Result, SavedArticleRecord, SavedArticleStore,
};

use super::new_saved_id;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS saved_articles (
        id TEXT PRIMARY KEY,
        article_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (user_id, article_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_preferences (
        user_id TEXT PRIMARY KEY,
        topics TEXT NOT NULL,
        keywords TEXT NOT NULL,
        sources TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

fn storage_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::Config(format!("Invalid database URL {}: {}", database_url, e)))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self { pool })
    }

    fn record_from_row(row: &SqliteRow) -> Result<SavedArticleRecord> {
        let created_at: String = row.get("created_at");
        Ok(SavedArticleRecord {
            id: row.get("id"),
            article_id: row.get("article_id"),
            user_id: row.get("user_id"),
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))?
                .with_timezone(&Utc),
        })
    }

    fn decode_set(row: &SqliteRow, column: &str) -> Result<BTreeSet<String>> {
        let raw: String = row.get(column);
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SavedArticleStore for SqliteStorage {
    async fn save(&self, user_id: &str, article_id: &str) -> Result<SavedArticleRecord> {
        let existing = sqlx::query("SELECT id FROM saved_articles WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to look up saved article", e))?;
        if existing.is_some() {
            return Err(Error::Duplicate("Article already saved".to_string()));
        }

        let record = SavedArticleRecord {
            id: new_saved_id(),
            article_id: article_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO saved_articles (id, article_id, user_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.article_id)
        .bind(&record.user_id)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Duplicate("Article already saved".to_string())
            }
            e => storage_error("Failed to save article", e),
        })?;

        debug!("Saved {} for {} as {}", article_id, user_id, record.id);
        Ok(record)
    }

    async fn remove(&self, user_id: &str, article_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM saved_articles WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to remove saved article", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Article not found".to_string()));
        }
        Ok(())
    }

    async fn list_for(&self, user_id: &str) -> Result<Vec<SavedArticleRecord>> {
        let rows = sqlx::query(
            "SELECT id, article_id, user_id, created_at FROM saved_articles WHERE user_id = ? ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list saved articles", e))?;

        rows.iter().map(Self::record_from_row).collect()
    }
}

#[async_trait]
impl PreferenceStore for SqliteStorage {
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceSet> {
        let row = sqlx::query("SELECT topics, keywords, sources FROM user_preferences WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to read preferences", e))?;

        match row {
            Some(row) => Ok(PreferenceSet {
                topics: Self::decode_set(&row, "topics")?,
                keywords: Self::decode_set(&row, "keywords")?,
                sources: Self::decode_set(&row, "sources")?,
            }),
            None => {
                let initial = PreferenceSet::initial();
                self.set_preferences(user_id, initial.clone()).await?;
                Ok(initial)
            }
        }
    }

    async fn set_preferences(&self, user_id: &str, preferences: PreferenceSet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, topics, keywords, sources, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                topics = excluded.topics,
                keywords = excluded.keywords,
                sources = excluded.sources,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(serde_json::to_string(&preferences.topics)?)
        .bind(serde_json::to_string(&preferences.keywords)?)
        .bind(serde_json::to_string(&preferences.sources)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to store preferences", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> SqliteStorage {
        SqliteStorage::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_save_remove_and_duplicates() {
        let storage = storage().await;
        let record = storage.save("alice", "a1").await.unwrap();
        assert_eq!(record.article_id, "a1");

        assert!(matches!(storage.save("alice", "a1").await, Err(Error::Duplicate(_))));
        storage.save("alice", "a2").await.unwrap();

        let listed = storage.list_for("alice").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, record.id);

        assert!(matches!(storage.remove("alice", "zzz").await, Err(Error::NotFound(_))));
        assert_eq!(storage.list_for("alice").await.unwrap().len(), 2);

        storage.remove("alice", "a1").await.unwrap();
        let listed = storage.list_for("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].article_id, "a2");
    }

    #[tokio::test]
    async fn test_preferences_roundtrip() {
        let storage = storage().await;
        assert_eq!(storage.get_preferences("bob").await.unwrap(), PreferenceSet::initial());

        let mut preferences = PreferenceSet::default();
        preferences.sources.insert("reuters".to_string());
        storage.set_preferences("bob", preferences.clone()).await.unwrap();
        assert_eq!(storage.get_preferences("bob").await.unwrap(), preferences);
    }
}
