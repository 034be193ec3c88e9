use async_trait::async_trait;
use crate::types::{HeadlineQuery, HeadlinesResponse, RawArticle, SentimentAnalysis};
use crate::Result;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one page of top headlines
    async fn fetch_headlines(&self, query: &HeadlineQuery) -> Result<HeadlinesResponse>;
}

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize an article in a few sentences
    async fn summarize(&self, article: &RawArticle) -> Result<String>;

    /// Classify the tone of an article
    async fn classify_sentiment(&self, article: &RawArticle) -> Result<SentimentAnalysis>;
}
