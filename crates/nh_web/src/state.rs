use std::sync::Arc;

use nh_core::{Config, IdentityResolver, PreferenceStore, Result, SavedArticleStore, UnverifiedClaims};
use nh_news::NewsApiClient;
use nh_storage::Storage;

/// Everything the route handlers share.
///
/// The server always talks to the providers directly: it is the party
/// holding the credentials.
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub news: NewsApiClient,
    pub saved: Arc<dyn SavedArticleStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(config: Config, storage: Storage) -> Result<Self> {
        let http = config.http_client()?;
        let news = NewsApiClient::direct(http.clone(), &config.news_api_url, config.news_api_key.clone());
        Ok(Self {
            config,
            http,
            news,
            saved: storage.saved,
            preferences: storage.preferences,
            identity: Arc::new(UnverifiedClaims),
        })
    }

    /// Swap the token decoder, e.g. for one backed by a verifying auth service.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }
}
