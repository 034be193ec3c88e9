use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::types::DEFAULT_COUNTRY;
use crate::{Error, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3-haiku";
pub const DEFAULT_REFERER: &str = "https://newshub-subspace.vercel.app";
pub const DEFAULT_TITLE: &str = "NewsHub";
pub const DEFAULT_PAGE_SIZE: u32 = 3;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://newshub.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How clients reach the external providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Call the providers with locally held credentials.
    Direct,
    /// Go through a NewsHub server that holds the credentials.
    Proxy { base_url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_url: String,
    pub model: String,
    pub referer: String,
    pub app_title: String,
    pub routing: Routing,
    pub page_size: u32,
    pub country: String,
    pub bind: String,
    pub storage: StorageKind,
    pub database_url: String,
    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("news_api_key", &self.news_api_key.as_deref().map(|_| "<redacted>"))
            .field("news_api_url", &self.news_api_url)
            .field("openrouter_api_key", &self.openrouter_api_key.as_deref().map(|_| "<redacted>"))
            .field("openrouter_url", &self.openrouter_url)
            .field("model", &self.model)
            .field("routing", &self.routing)
            .field("page_size", &self.page_size)
            .field("country", &self.country)
            .field("bind", &self.bind)
            .field("storage", &self.storage)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            openrouter_api_key: None,
            openrouter_url: DEFAULT_OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            app_title: DEFAULT_TITLE.to_string(),
            routing: Routing::Direct,
            page_size: DEFAULT_PAGE_SIZE,
            country: DEFAULT_COUNTRY.to_string(),
            bind: DEFAULT_BIND.to_string(),
            storage: StorageKind::Memory,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let routing = match get("NEWSHUB_PROXY_URL") {
            Some(base_url) => {
                url::Url::parse(&base_url)
                    .map_err(|e| Error::Config(format!("NEWSHUB_PROXY_URL is not a valid URL: {}", e)))?;
                Routing::Proxy {
                    base_url: base_url.trim_end_matches('/').to_string(),
                }
            }
            None => Routing::Direct,
        };

        let page_size = match get("NEWSHUB_PAGE_SIZE") {
            Some(value) => parse_number::<u32>("NEWSHUB_PAGE_SIZE", &value)?,
            None => defaults.page_size,
        };
        if !(1..=100).contains(&page_size) {
            return Err(Error::Config("NEWSHUB_PAGE_SIZE must be between 1 and 100".to_string()));
        }

        let http_timeout = match get("NEWSHUB_HTTP_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number::<u64>("NEWSHUB_HTTP_TIMEOUT_SECS", &value)?),
            None => defaults.http_timeout,
        };

        let storage = match get("NEWSHUB_STORAGE") {
            Some(value) => value.parse()?,
            None => defaults.storage,
        };

        Ok(Self {
            news_api_key: get("NEWS_API_KEY"),
            news_api_url: get("NEWS_API_URL").unwrap_or(defaults.news_api_url),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_url: get("OPENROUTER_URL").unwrap_or(defaults.openrouter_url),
            model: get("OPENROUTER_MODEL").unwrap_or(defaults.model),
            referer: get("NEWSHUB_REFERER").unwrap_or(defaults.referer),
            app_title: get("NEWSHUB_TITLE").unwrap_or(defaults.app_title),
            routing,
            page_size,
            country: get("NEWSHUB_COUNTRY").unwrap_or(defaults.country),
            bind: get("NEWSHUB_BIND").unwrap_or(defaults.bind),
            storage,
            database_url: get("NEWSHUB_DATABASE_URL").unwrap_or(defaults.database_url),
            http_timeout,
        })
    }

    /// The completion API credential, required for direct enrichment.
    pub fn require_openrouter_api_key(&self) -> Result<&str> {
        self.openrouter_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENROUTER_API_KEY must be set".to_string()))
    }

    /// Shared outbound HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()?)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, value)))
}
