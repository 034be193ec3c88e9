use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Categories understood by the headlines provider.
pub const CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// Display label that stands for "no category filter".
pub const TOP_STORIES: &str = "Top Stories";

pub const DEFAULT_COUNTRY: &str = "us";

/// Maps a display label onto the provider's category parameter.
pub fn category_param(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label.eq_ignore_ascii_case(TOP_STORIES) {
        None
    } else {
        Some(label.to_lowercase())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
}

/// An article exactly as the headlines provider delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// Body returned by the headlines endpoint and by the news proxy route.
///
/// A proxy-side failure is reported as `status: "error"` together with an
/// `error` message and a substitute batch of articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

impl HeadlinesResponse {
    pub fn ok(articles: Vec<RawArticle>, total_results: Option<u32>) -> Self {
        Self {
            status: "ok".to_string(),
            total_results,
            error: None,
            articles,
        }
    }

    pub fn error(message: impl Into<String>, articles: Vec<RawArticle>) -> Self {
        Self {
            status: "error".to_string(),
            total_results: None,
            error: Some(message.into()),
            articles,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Parameters of one headlines request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub category: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub country: String,
}

impl HeadlineQuery {
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(
        category: Option<String>,
        page: u32,
        page_size: u32,
        country: impl Into<String>,
    ) -> Result<Self> {
        if page < 1 {
            return Err(Error::Validation("page must be at least 1".to_string()));
        }
        if !(1..=Self::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::Validation(format!(
                "pageSize must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }
        if let Some(category) = &category {
            if !CATEGORIES.contains(&category.as_str()) {
                return Err(Error::Validation(format!("Unknown category: {}", category)));
            }
        }
        let country = country.into();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Validation(format!("Invalid country code: {}", country)));
        }

        Ok(Self {
            category,
            page,
            page_size,
            country: country.to_lowercase(),
        })
    }

    /// Zero-based position of the first article of this page.
    pub fn first_index(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Scans free text for a sentiment word, "positive" winning over "negative".
    pub fn scan(text: &str) -> Self {
        let lowered = text.to_lowercase();
        if lowered.contains("positive") {
            Sentiment::Positive
        } else if lowered.contains("negative") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(Error::Validation(format!("Unknown sentiment: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    pub explanation: String,
}

/// A raw article augmented with its summary and sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedArticle {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticleRecord {
    pub id: String,
    pub article_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub topics: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    pub sources: BTreeSet<String>,
}

impl PreferenceSet {
    /// Preferences handed out to a user who never stored any.
    pub fn initial() -> Self {
        fn set(items: &[&str]) -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            topics: set(&["technology", "business"]),
            keywords: set(&["AI", "climate"]),
            sources: set(&["bbc-news", "the-verge"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_param() {
        assert_eq!(category_param("Top Stories"), None);
        assert_eq!(category_param(""), None);
        assert_eq!(category_param("Technology"), Some("technology".to_string()));
    }

    #[test]
    fn test_headline_query_validation() {
        assert!(HeadlineQuery::new(None, 1, 10, "us").is_ok());
        assert!(HeadlineQuery::new(Some("sports".into()), 3, 100, "GB").is_ok());
        assert!(matches!(HeadlineQuery::new(None, 0, 10, "us"), Err(Error::Validation(_))));
        assert!(matches!(HeadlineQuery::new(None, 1, 0, "us"), Err(Error::Validation(_))));
        assert!(matches!(HeadlineQuery::new(None, 1, 101, "us"), Err(Error::Validation(_))));
        assert!(matches!(
            HeadlineQuery::new(Some("politics".into()), 1, 10, "us"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(HeadlineQuery::new(None, 1, 10, "usa"), Err(Error::Validation(_))));

        let query = HeadlineQuery::new(None, 3, 5, "GB").unwrap();
        assert_eq!(query.first_index(), 10);
        assert_eq!(query.country, "gb");
    }

    #[test]
    fn test_sentiment_parsing_and_scan() {
        assert_eq!("Positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!(" NEGATIVE ".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("mixed".parse::<Sentiment>().is_err());

        assert_eq!(Sentiment::scan("Overall a POSITIVE outlook"), Sentiment::Positive);
        assert_eq!(Sentiment::scan("negative, though positive in places"), Sentiment::Positive);
        assert_eq!(Sentiment::scan("clearly negative"), Sentiment::Negative);
        assert_eq!(Sentiment::scan("no opinion either way"), Sentiment::Neutral);
    }

    #[test]
    fn test_raw_article_accepts_provider_nulls() {
        let json = r#"{
            "source": {"id": null, "name": "Wired"},
            "author": null,
            "title": "Chips",
            "description": null,
            "url": "https://example.com/chips",
            "urlToImage": null,
            "publishedAt": "2024-05-01T12:00:00Z",
            "content": null
        }"#;
        let article: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(article.source.name, "Wired");
        assert_eq!(article.description, "");
        assert_eq!(article.content, "");
    }

    #[test]
    fn test_enriched_article_wire_names() {
        let article = EnrichedArticle {
            id: "article-1-0-0".to_string(),
            title: "Title".to_string(),
            source: "CNN".to_string(),
            published_at: Utc::now(),
            url: "https://example.com".to_string(),
            summary: Some("Summary".to_string()),
            sentiment: Some(Sentiment::Negative),
            sentiment_explanation: Some("Because".to_string()),
        };
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["sentiment"], "negative");
        assert_eq!(value["sentimentExplanation"], "Because");
        assert!(value.get("publishedAt").is_some());
    }
}
