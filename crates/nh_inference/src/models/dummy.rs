use std::fmt;

use nh_core::{InferenceModel, RawArticle, Result, Sentiment, SentimentAnalysis};

const POSITIVE_WORDS: [&str; 8] = ["growth", "win", "record", "success", "breakthrough", "rally", "improve", "gain"];
const NEGATIVE_WORDS: [&str; 8] = ["crisis", "loss", "decline", "crash", "layoff", "war", "fail", "death"];

/// Offline model: extractive summaries and a small word list for tone.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn body(article: &RawArticle) -> &str {
    if article.content.trim().is_empty() {
        &article.description
    } else {
        &article.content
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, article: &RawArticle) -> Result<String> {
        let sentences: Vec<&str> = body(article)
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(3)
            .collect();

        if sentences.is_empty() {
            return Ok(article.title.clone());
        }
        let summary = sentences.join(". ") + ".";
        tracing::debug!("Generated summary from content: {}", summary);
        Ok(summary)
    }

    async fn classify_sentiment(&self, article: &RawArticle) -> Result<SentimentAnalysis> {
        let text = format!("{} {} {}", article.title, article.description, article.content).to_lowercase();
        let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count();
        let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count();

        let sentiment = match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };
        Ok(SentimentAnalysis {
            sentiment,
            explanation: format!(
                "Found {} positive and {} negative cue words, so the tone reads as {}.",
                positive, negative, sentiment
            ),
        })
    }
}
