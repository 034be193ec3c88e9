//! Deterministic placeholder content.
//!
//! Used whenever a provider is unconfigured or unreachable so the reader
//! always has something on screen. Every field is a pure function of the
//! category and the zero-based article index.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::types::{
    ArticleSource, EnrichedArticle, HeadlinesResponse, RawArticle, Sentiment,
};

pub const SOURCES: [&str; 5] = ["BBC News", "CNN", "The Verge", "Wired", "Reuters"];

pub const ARTICLE_URL: &str = "https://example.com/article";

const TOTAL_RESULTS: u32 = 100;

// 2024-01-01T00:00:00Z, so repeated calls produce identical timestamps.
const ANCHOR_SECS: i64 = 1_704_067_200;

fn anchor() -> DateTime<Utc> {
    Utc.timestamp_opt(ANCHOR_SECS, 0).single().unwrap_or_default()
}

// Clamps to the earliest representable instant for very deep pages.
fn published_at(index: usize) -> DateTime<Utc> {
    i64::try_from(index)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|offset| anchor().checked_sub_signed(offset))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn source_for(index: usize) -> &'static str {
    SOURCES[index % SOURCES.len()]
}

pub fn sentiment_for(index: usize) -> Sentiment {
    Sentiment::ALL[index % Sentiment::ALL.len()]
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn raw_article(category: Option<&str>, index: usize) -> RawArticle {
    let category = category.unwrap_or("general");
    let n = index + 1;
    RawArticle {
        source: ArticleSource {
            id: None,
            name: source_for(index).to_string(),
        },
        author: Some(format!("Author {}", n)),
        title: format!("{} News Article {}", capitalize(category), n),
        description: format!(
            "This is a description for {} news article {}. It provides a brief overview of the content.",
            category, n
        ),
        url: ARTICLE_URL.to_string(),
        url_to_image: None,
        published_at: published_at(index),
        content: format!(
            "This is the full content of the {} article {}. It contains more detailed information about the topic and expands on what was mentioned in the description.",
            category, n
        ),
    }
}

/// One page of placeholder headlines, indices `(page-1)*page_size ..`.
pub fn raw_articles(category: Option<&str>, page: u32, page_size: u32) -> Vec<RawArticle> {
    let start = (page.max(1) as usize - 1) * page_size as usize;
    (start..start + page_size as usize)
        .map(|index| raw_article(category, index))
        .collect()
}

pub fn headlines(category: Option<&str>, page: u32, page_size: u32) -> HeadlinesResponse {
    HeadlinesResponse::ok(raw_articles(category, page, page_size), Some(TOTAL_RESULTS))
}

/// Id slug for a display label: whitespace becomes `_`.
pub fn slug(label: &str) -> String {
    label.replace(char::is_whitespace, "_")
}

// `index` drives source, sentiment and time; `number` is the one shown in text.
fn annotated(label: &str, index: usize, number: usize) -> EnrichedArticle {
    let sentiment = sentiment_for(index);
    EnrichedArticle {
        id: format!("article-{}-{}", slug(label), index),
        title: format!("{} News Article {}", label, number),
        source: source_for(index).to_string(),
        published_at: published_at(index),
        url: ARTICLE_URL.to_string(),
        summary: Some(format!(
            "This is a summary of the {} article {}. It contains key information from the original article processed by AI to be concise and informative.",
            label.to_lowercase(),
            number
        )),
        sentiment: Some(sentiment),
        sentiment_explanation: Some(format!(
            "The article {} has a {} tone because of the language used and the context of the information presented.",
            number, sentiment
        )),
    }
}

/// A placeholder article that already carries summary and sentiment.
pub fn enriched_article(label: &str, index: usize) -> EnrichedArticle {
    annotated(label, index, index + 1)
}

pub fn enriched_articles(label: &str, page: u32, page_size: u32) -> Vec<EnrichedArticle> {
    let start = (page.max(1) as usize - 1) * page_size as usize;
    (start..start + page_size as usize)
        .map(|index| enriched_article(label, index))
        .collect()
}

/// Detail view for a bookmarked article identifier.
///
/// The label is the second `-` segment (with `_` read back as a space) and
/// the number is the third, shown as is: `article-Science-7` becomes
/// "Science News Article 7". For feed-issued ids
/// (`article-<slug>-<page>-<i>-<stamp>`) that number is the page. Ids
/// without a numeric third segment get a stable number derived from their
/// bytes.
pub fn saved_article_details(article_id: &str) -> EnrichedArticle {
    let parts: Vec<&str> = article_id.split('-').collect();
    let label = parts
        .get(1)
        .filter(|label| !label.is_empty())
        .map(|label| label.replace('_', " "))
        .unwrap_or_else(|| "Technology".to_string());
    let number = parts
        .get(2)
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or_else(|| article_id.bytes().map(usize::from).sum::<usize>() % 100);

    EnrichedArticle {
        id: article_id.to_string(),
        ..annotated(&label, number, number)
    }
}
