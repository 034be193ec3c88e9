use std::sync::Arc;

use nh_core::Sentiment;
use nh_feed::{FeedController, LOAD_ERROR_MESSAGE};
use nh_inference::OpenRouterModel;
use nh_news::NewsApiClient;
use reqwest::Client;

// Nothing listens on the discard port.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn unreachable_feed() -> FeedController {
    let news = NewsApiClient::direct(Client::new(), UNREACHABLE, Some("news-key".to_string()));
    let model = OpenRouterModel::direct(
        Client::new(),
        UNREACHABLE,
        Some("router-key".to_string()),
        "anthropic/claude-3-haiku",
    )
    .unwrap();
    FeedController::new(Arc::new(news), Arc::new(model), 3)
}

#[tokio::test]
async fn test_unreachable_providers_still_fill_the_page() {
    let mut feed = unreachable_feed();
    assert_eq!(feed.select_category("Technology").await, 3);

    assert!(feed.has_more());
    assert_eq!(feed.error(), Some(LOAD_ERROR_MESSAGE));
    for (i, article) in feed.articles().iter().enumerate() {
        assert_eq!(article.title, format!("Technology News Article {}", i + 1));
        assert!(Sentiment::ALL.contains(&article.sentiment.unwrap()));
        assert!(!article.summary.as_deref().unwrap_or_default().is_empty());
    }
}

#[tokio::test]
async fn test_unreachable_providers_append_on_load_more() {
    let mut feed = unreachable_feed();
    feed.select_category("Technology").await;
    feed.load_more().await.unwrap();

    assert_eq!(feed.articles().len(), 6);
    assert_eq!(feed.articles()[5].title, "Technology News Article 6");
}
