use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error, warn};

use nh_core::config::{Config, Routing};
use nh_core::{synthetic, Error, HeadlineQuery, HeadlinesResponse, NewsProvider, Result};

/// Path of the news proxy route on a NewsHub server.
pub const PROXY_PATH: &str = "/api/news";

#[derive(Clone)]
enum NewsRoute {
    Direct {
        base_url: String,
        api_key: Option<String>,
    },
    Proxy {
        endpoint: String,
    },
}

/// Client for the top-headlines provider.
///
/// Headline requests never fail: a missing credential or any upstream
/// problem yields a deterministic synthetic page instead.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    route: NewsRoute,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("NewsApiClient");
        match &self.route {
            NewsRoute::Direct { base_url, api_key } => debug
                .field("base_url", base_url)
                .field("api_key", &api_key.as_deref().map(|_| "<redacted>")),
            NewsRoute::Proxy { endpoint } => debug.field("proxy", endpoint),
        };
        debug.finish()
    }
}

/// Parameters of a keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, page_size: u32) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::Validation("Search query is required".to_string()));
        }
        if !(1..=HeadlineQuery::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::Validation(format!(
                "pageSize must be between 1 and {}",
                HeadlineQuery::MAX_PAGE_SIZE
            )));
        }
        Ok(Self {
            query,
            from: None,
            to: None,
            page_size,
        })
    }

    pub fn between(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

impl NewsApiClient {
    /// Picks direct or proxied routing from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        Ok(match &config.routing {
            Routing::Direct => Self::direct(client, &config.news_api_url, config.news_api_key.clone()),
            Routing::Proxy { base_url } => Self::proxied(client, base_url),
        })
    }

    pub fn direct(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            route: NewsRoute::Direct {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            },
        }
    }

    pub fn proxied(client: Client, server_url: &str) -> Self {
        Self {
            client,
            route: NewsRoute::Proxy {
                endpoint: format!("{}{}", server_url.trim_end_matches('/'), PROXY_PATH),
            },
        }
    }

    /// A single upstream headlines request, without any fallback.
    pub async fn request_headlines(&self, query: &HeadlineQuery) -> Result<HeadlinesResponse> {
        Ok(self.send_headlines(query).await?.json::<HeadlinesResponse>().await?)
    }

    /// Like `request_headlines`, but hands back the provider's body untouched.
    ///
    /// Used by the news proxy route, which relays that body and shapes its
    /// own fallback envelope.
    pub async fn request_headlines_raw(&self, query: &HeadlineQuery) -> Result<Value> {
        Ok(self.send_headlines(query).await?.json::<Value>().await?)
    }

    async fn send_headlines(&self, query: &HeadlineQuery) -> Result<Response> {
        let mut params: Vec<(&str, String)> = vec![
            ("country", query.country.clone()),
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }

        let request = match &self.route {
            NewsRoute::Direct { base_url, api_key } => {
                let api_key = api_key
                    .as_deref()
                    .ok_or_else(|| Error::Config("NEWS_API_KEY must be set".to_string()))?;
                self.client
                    .get(format!("{}/top-headlines", base_url))
                    .header("X-Api-Key", api_key)
            }
            NewsRoute::Proxy { endpoint } => self.client.get(endpoint.as_str()),
        };

        debug!("Requesting headlines page {} ({:?})", query.page, query.category);
        let response = request.query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Keyword search over all articles. Needs a direct credential.
    pub async fn search(&self, query: &SearchQuery) -> Result<HeadlinesResponse> {
        let (base_url, api_key) = match &self.route {
            NewsRoute::Direct { base_url, api_key: Some(api_key) } => (base_url, api_key),
            NewsRoute::Direct { api_key: None, .. } => {
                return Err(Error::Config("NEWS_API_KEY must be set".to_string()));
            }
            NewsRoute::Proxy { .. } => {
                return Err(Error::Config("Search is only available with direct routing".to_string()));
            }
        };

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(from) = &query.from {
            params.push(("from", from.clone()));
        }
        if let Some(to) = &query.to {
            params.push(("to", to.clone()));
        }

        let response = self
            .client
            .get(format!("{}/everything", base_url))
            .header("X-Api-Key", api_key)
            .query(&params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("News search failed with status {}", status);
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<HeadlinesResponse>().await?)
    }

    fn has_credential(&self) -> bool {
        match &self.route {
            NewsRoute::Direct { api_key, .. } => api_key.is_some(),
            NewsRoute::Proxy { .. } => true,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn name(&self) -> &str {
        match self.route {
            NewsRoute::Direct { .. } => "NewsAPI",
            NewsRoute::Proxy { .. } => "NewsAPI (proxied)",
        }
    }

    async fn fetch_headlines(&self, query: &HeadlineQuery) -> Result<HeadlinesResponse> {
        let category = query.category.as_deref();

        if !self.has_credential() {
            warn!("NEWS_API_KEY not configured, using synthetic headlines");
            return Ok(synthetic::headlines(category, query.page, query.page_size));
        }

        match self.request_headlines(query).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("Error fetching headlines: {}", e);
                warn!("Falling back to synthetic headlines for page {}", query.page);
                Ok(synthetic::headlines(category, query.page, query.page_size))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_yields_synthetic_page() {
        let client = NewsApiClient::direct(Client::new(), "http://127.0.0.1:9", None);
        let query = HeadlineQuery::new(Some("technology".into()), 2, 4, "us").unwrap();

        let response = client.fetch_headlines(&query).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.articles.len(), 4);
        for (i, article) in response.articles.iter().enumerate() {
            let index = query.first_index() + i;
            assert_eq!(article.source.name, synthetic::SOURCES[index % 5]);
            assert_eq!(article.title, format!("Technology News Article {}", index + 1));
        }

        let again = client.fetch_headlines(&query).await.unwrap();
        assert_eq!(response, again);
    }

    #[tokio::test]
    async fn test_missing_key_survives_deep_pages() {
        let client = NewsApiClient::direct(Client::new(), "http://127.0.0.1:9", None);
        let query = HeadlineQuery::new(Some("technology".into()), 30_000_000, 100, "us").unwrap();

        let response = client.fetch_headlines(&query).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.articles.len(), 100);
    }

    #[tokio::test]
    async fn test_request_headlines_requires_key() {
        let client = NewsApiClient::direct(Client::new(), "http://127.0.0.1:9", None);
        let query = HeadlineQuery::new(None, 1, 3, "us").unwrap();
        assert!(matches!(client.request_headlines(&query).await, Err(Error::Config(_))));
    }

    #[test]
    fn test_search_query_validation() {
        assert!(SearchQuery::new("  ", 10).is_err());
        assert!(SearchQuery::new("rust", 0).is_err());
        let query = SearchQuery::new("rust", 10)
            .unwrap()
            .between(Some("2024-01-01".into()), None);
        assert_eq!(query.from.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = NewsApiClient::direct(Client::new(), "https://newsapi.org/v2", Some("secret".into()));
        assert!(!format!("{:?}", client).contains("secret"));
    }
}
