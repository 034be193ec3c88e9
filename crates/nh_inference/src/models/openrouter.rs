use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use nh_core::config::{Config, Routing};
use nh_core::{Error, InferenceModel, RawArticle, Result, SentimentAnalysis};

use crate::sentiment::parse_sentiment_reply;

/// Path of the completion proxy route on a NewsHub server.
pub const PROXY_PATH: &str = "/api/openrouter";

const SENTIMENT_SYSTEM_PROMPT: &str = "You are an AI that analyzes the sentiment of news articles. Always respond with valid JSON in this format: {\"sentiment\": \"positive|negative|neutral\", \"explanation\": \"brief explanation of the sentiment\"}";

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Clone)]
enum CompletionRoute {
    Direct { base_url: String, api_key: String },
    Proxy { endpoint: String },
}

/// Chat-completion backed summaries and sentiment labels.
#[derive(Clone)]
pub struct OpenRouterModel {
    client: Client,
    route: CompletionRoute,
    model: String,
    referer: String,
    title: String,
}

impl fmt::Debug for OpenRouterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.route {
            CompletionRoute::Direct { base_url, .. } => base_url,
            CompletionRoute::Proxy { endpoint } => endpoint,
        };
        f.debug_struct("OpenRouterModel")
            .field("client", &"<reqwest::Client>")
            .field("target", target)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl OpenRouterModel {
    /// Direct routing needs `OPENROUTER_API_KEY`; without it this is a
    /// configuration error, never a silent fallback.
    pub fn new(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        let model = match &config.routing {
            Routing::Direct => Self::direct(
                client,
                &config.openrouter_url,
                config.openrouter_api_key.clone(),
                &config.model,
            )?,
            Routing::Proxy { base_url } => Self::proxied(client, base_url, &config.model),
        };
        Ok(model.with_headers(&config.referer, &config.app_title))
    }

    pub fn direct(client: Client, base_url: &str, api_key: Option<String>, model: &str) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("OPENROUTER_API_KEY not found in environment variables".to_string()))?;
        Ok(Self {
            client,
            route: CompletionRoute::Direct {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            },
            model: model.to_string(),
            referer: nh_core::config::DEFAULT_REFERER.to_string(),
            title: nh_core::config::DEFAULT_TITLE.to_string(),
        })
    }

    pub fn proxied(client: Client, server_url: &str, model: &str) -> Self {
        Self {
            client,
            route: CompletionRoute::Proxy {
                endpoint: format!("{}{}", server_url.trim_end_matches('/'), PROXY_PATH),
            },
            model: model.to_string(),
            referer: nh_core::config::DEFAULT_REFERER.to_string(),
            title: nh_core::config::DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_headers(mut self, referer: &str, title: &str) -> Self {
        self.referer = referer.to_string();
        self.title = title.to_string();
        self
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String> {
        let builder = match &self.route {
            CompletionRoute::Direct { base_url, api_key } => self
                .client
                .post(format!("{}/chat/completions", base_url))
                .header("Authorization", format!("Bearer {}", api_key))
                .header("HTTP-Referer", &self.referer)
                .header("X-Title", &self.title),
            CompletionRoute::Proxy { endpoint } => self
                .client
                .post(endpoint.as_str())
                .header("Origin", &self.referer),
        };

        let response = builder.json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Completion request failed with status {}", status);
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("completion body: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::MalformedResponse("completion has no choices".to_string()))
    }
}

fn article_text(article: &RawArticle) -> String {
    format!("{}\n\n{}\n\n{}", article.title, article.description, article.content)
}

#[async_trait]
impl InferenceModel for OpenRouterModel {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn summarize(&self, article: &RawArticle) -> Result<String> {
        debug!("Summarizing: {}", article.title);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: format!(
                    "Please provide a concise summary of the following news article in about 3-4 sentences. Focus on the key information, facts, and context:\n\n{}",
                    article_text(article)
                ),
            }],
            response_format: None,
        };

        Ok(self.complete(&request).await?.trim().to_string())
    }

    async fn classify_sentiment(&self, article: &RawArticle) -> Result<SentimentAnalysis> {
        debug!("Classifying sentiment: {}", article.title);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SENTIMENT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Analyze the sentiment of the following news article as 'positive', 'negative', or 'neutral'. Then provide a brief explanation for your sentiment classification in about 2 sentences.\n\n{}",
                        article_text(article)
                    ),
                },
            ],
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };

        let reply = self.complete(&request).await?;
        Ok(parse_sentiment_reply(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_requires_api_key() {
        let result = OpenRouterModel::direct(Client::new(), "https://openrouter.ai/api/v1", None, "m");
        assert!(matches!(result, Err(Error::Config(_))));

        let result = OpenRouterModel::direct(Client::new(), "https://openrouter.ai/api/v1", Some(String::new()), "m");
        assert!(matches!(result, Err(Error::Config(_))));

        let result = OpenRouterModel::direct(Client::new(), "https://openrouter.ai/api/v1", Some("key".into()), "m");
        assert!(result.is_ok());
    }

    #[test]
    fn test_new_follows_routing() {
        let config = Config::default();
        assert!(matches!(OpenRouterModel::new(&config), Err(Error::Config(_))));

        let config = Config {
            routing: Routing::Proxy { base_url: "http://localhost:3000".to_string() },
            ..Config::default()
        };
        let model = OpenRouterModel::new(&config).unwrap();
        assert!(format!("{:?}", model).contains("http://localhost:3000/api/openrouter"));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "anthropic/claude-3-haiku",
            messages: vec![ChatMessage { role: "user", content: "hi".to_string() }],
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");

        let request = ChatRequest { response_format: None, ..request };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("response_format").is_none());
    }
}
