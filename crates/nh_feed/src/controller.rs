use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use nh_core::{
    category_param, synthetic, EnrichedArticle, Error, HeadlineQuery, InferenceModel,
    NewsProvider, RawArticle, Result, DEFAULT_COUNTRY,
};

/// Message shown alongside placeholder content after a failed cycle.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load articles. Please try again later.";

/// Placeholder pages keep offering "load more" below this page number.
pub const FALLBACK_PAGE_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading,
    LoadingMore,
    Ready,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Detailed,
    Summarized,
}

/// Drives fetch → enrich → accumulate cycles for one category at a time.
///
/// The list only ever grows through `load_more` and is only replaced when a
/// category is (re)selected. A failed cycle still leaves a full page of
/// synthetic articles in place and records `LOAD_ERROR_MESSAGE`.
pub struct FeedController {
    news: Arc<dyn NewsProvider>,
    inference: Arc<dyn InferenceModel>,
    page_size: u32,
    country: String,
    category: Option<String>,
    articles: Vec<EnrichedArticle>,
    page: u32,
    has_more: bool,
    error: Option<String>,
    mode: DisplayMode,
    last_stamp: i64,
    state: watch::Sender<FeedState>,
}

impl FeedController {
    pub fn new(news: Arc<dyn NewsProvider>, inference: Arc<dyn InferenceModel>, page_size: u32) -> Self {
        let (state, _) = watch::channel(FeedState::Idle);
        Self {
            news,
            inference,
            page_size: page_size.clamp(1, HeadlineQuery::MAX_PAGE_SIZE),
            country: DEFAULT_COUNTRY.to_string(),
            category: None,
            articles: Vec::new(),
            page: 1,
            has_more: true,
            error: None,
            mode: DisplayMode::default(),
            last_stamp: 0,
            state,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn articles(&self) -> &[EnrichedArticle] {
        &self.articles
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Heuristic: the provider does not report what remains, so a full page
    /// is taken to mean there may be another one.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> FeedState {
        *self.state.borrow()
    }

    /// Observe state transitions, e.g. to show a spinner.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.mode = match self.mode {
            DisplayMode::Detailed => DisplayMode::Summarized,
            DisplayMode::Summarized => DisplayMode::Detailed,
        };
        self.mode
    }

    /// Switches to a category: clears the list and loads its first page.
    pub async fn select_category(&mut self, label: &str) -> usize {
        info!("Selecting category {}", label);
        self.category = Some(label.to_string());
        self.articles.clear();
        self.page = 1;
        self.has_more = true;
        self.run_cycle(1, true).await
    }

    /// Reloads the first page of the current category.
    pub async fn retry(&mut self) -> Result<usize> {
        let label = self
            .category
            .clone()
            .ok_or_else(|| Error::Validation("No category selected".to_string()))?;
        Ok(self.select_category(&label).await)
    }

    /// Loads the next page and appends it to the list.
    pub async fn load_more(&mut self) -> Result<usize> {
        if self.category.is_none() {
            return Err(Error::Validation("No category selected".to_string()));
        }
        if !self.has_more {
            return Err(Error::Validation("No more articles to load".to_string()));
        }
        self.page += 1;
        Ok(self.run_cycle(self.page, false).await)
    }

    async fn run_cycle(&mut self, page: u32, initial: bool) -> usize {
        let label = self.category.clone().unwrap_or_else(|| nh_core::TOP_STORIES.to_string());
        self.state.send_replace(if initial { FeedState::Loading } else { FeedState::LoadingMore });
        self.error = None;

        let (articles, has_more) = match self.fetch_and_enrich(&label, page).await {
            Ok((articles, returned)) => {
                debug!("Page {} of {}: {} raw, {} enriched", page, label, returned, articles.len());
                (articles, page == 1 || returned >= self.page_size as usize)
            }
            Err(e) => {
                error!("Error fetching articles for {} page {}: {}", label, page, e);
                warn!("Showing synthetic articles for {} page {}", label, page);
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
                (self.fallback_page(&label, page), page < FALLBACK_PAGE_LIMIT)
            }
        };

        let added = articles.len();
        if initial {
            self.articles = articles;
        } else {
            self.articles.extend(articles);
        }
        self.has_more = has_more;
        self.state.send_replace(FeedState::Ready);
        added
    }

    /// One page: fetch raw headlines, then summary and sentiment for every
    /// article, all concurrently. Returns the enriched page and how many raw
    /// articles the provider handed back.
    async fn fetch_and_enrich(&mut self, label: &str, page: u32) -> Result<(Vec<EnrichedArticle>, usize)> {
        let query = HeadlineQuery::new(category_param(label), page, self.page_size, self.country.as_str())?;
        let response = self.news.fetch_headlines(&query).await?;
        if !response.is_ok() {
            let reason = response.error.unwrap_or_else(|| format!("status {}", response.status));
            return Err(Error::External(anyhow::anyhow!("Failed to fetch articles: {}", reason)));
        }

        let returned = response.articles.len();
        let stamp = self.next_stamp();
        let slug = synthetic::slug(label);
        let inference = self.inference.clone();

        let enrichments = response
            .articles
            .iter()
            .take(self.page_size as usize)
            .enumerate()
            .map(|(i, article)| {
                let inference = inference.clone();
                let id = article_id(&slug, page, i, stamp);
                async move { enrich(inference.as_ref(), id, article).await }
            });

        let articles = join_all(enrichments)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok((articles, returned))
    }

    /// Synthetic page carrying the same id shape as an enriched one.
    fn fallback_page(&mut self, label: &str, page: u32) -> Vec<EnrichedArticle> {
        let stamp = self.next_stamp();
        let slug = synthetic::slug(label);
        synthetic::enriched_articles(label, page, self.page_size)
            .into_iter()
            .enumerate()
            .map(|(i, article)| EnrichedArticle {
                id: article_id(&slug, page, i, stamp),
                ..article
            })
            .collect()
    }

    // Millisecond timestamp, strictly increasing per controller.
    fn next_stamp(&mut self) -> i64 {
        self.last_stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        self.last_stamp
    }
}

fn article_id(slug: &str, page: u32, position: usize, stamp: i64) -> String {
    format!("article-{}-{}-{}-{}", slug, page, position, stamp)
}

async fn enrich(inference: &dyn InferenceModel, id: String, article: &RawArticle) -> Result<EnrichedArticle> {
    let (summary, analysis) = futures::try_join!(
        inference.summarize(article),
        inference.classify_sentiment(article)
    )?;

    Ok(EnrichedArticle {
        id,
        title: article.title.clone(),
        source: article.source.name.clone(),
        published_at: article.published_at,
        url: article.url.clone(),
        summary: Some(summary),
        sentiment: Some(analysis.sentiment),
        sentiment_explanation: Some(analysis.explanation),
    })
}
