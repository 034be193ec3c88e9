use nh_core::{synthetic, Error, HeadlineQuery, NewsProvider};
use nh_news::{NewsApiClient, SearchQuery};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn headline_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": "wired", "name": "Wired"},
                "author": "A. Writer",
                "title": "Chips are back",
                "description": "Fabs everywhere",
                "url": "https://example.com/chips",
                "urlToImage": null,
                "publishedAt": "2024-05-01T12:00:00Z",
                "content": "Long form"
            },
            {
                "source": {"id": null, "name": "CNN"},
                "author": null,
                "title": "Markets rally",
                "description": null,
                "url": "https://example.com/markets",
                "urlToImage": null,
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": null
            }
        ]
    })
}

#[tokio::test]
async fn test_direct_headlines_forward_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "gb"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "5"))
        .and(query_param("category", "technology"))
        .and(header("X-Api-Key", "news-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(headline_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::direct(Client::new(), &server.uri(), Some("news-key".into()));
    let query = HeadlineQuery::new(Some("technology".into()), 2, 5, "GB").unwrap();
    let response = client.fetch_headlines(&query).await.unwrap();

    assert!(response.is_ok());
    assert_eq!(response.total_results, Some(2));
    assert_eq!(response.articles.len(), 2);
    assert_eq!(response.articles[0].source.name, "Wired");
    assert_eq!(response.articles[1].description, "");
}

#[tokio::test]
async fn test_upstream_failure_degrades_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "error",
            "code": "rateLimited",
            "message": "Too many requests"
        })))
        .mount(&server)
        .await;

    let client = NewsApiClient::direct(Client::new(), &server.uri(), Some("news-key".into()));
    let query = HeadlineQuery::new(None, 1, 3, "us").unwrap();

    let response = client.fetch_headlines(&query).await.unwrap();
    assert_eq!(response, synthetic::headlines(None, 1, 3));

    let err = client.request_headlines(&query).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 429, .. }));
}

#[tokio::test]
async fn test_unreachable_provider_degrades_to_synthetic() {
    let client = NewsApiClient::direct(Client::new(), "http://127.0.0.1:9", Some("news-key".into()));
    let query = HeadlineQuery::new(Some("sports".into()), 1, 2, "us").unwrap();

    let response = client.fetch_headlines(&query).await.unwrap();
    assert_eq!(response.articles.len(), 2);
    assert_eq!(response.articles[0].title, "Sports News Article 1");
}

#[tokio::test]
async fn test_proxied_headlines_use_server_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(headline_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::proxied(Client::new(), &server.uri());
    let query = HeadlineQuery::new(None, 1, 3, "us").unwrap();
    let response = client.fetch_headlines(&query).await.unwrap();
    assert_eq!(response.articles.len(), 2);
}

#[tokio::test]
async fn test_search_hits_everything_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .and(query_param("q", "rust language"))
        .and(query_param("from", "2024-04-01"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(headline_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::direct(Client::new(), &server.uri(), Some("news-key".into()));
    let query = SearchQuery::new("rust language", 10)
        .unwrap()
        .between(Some("2024-04-01".into()), None);
    let response = client.search(&query).await.unwrap();
    assert_eq!(response.articles[1].title, "Markets rally");
}

#[tokio::test]
async fn test_search_needs_credential_and_surfaces_failures() {
    let query = SearchQuery::new("rust", 10).unwrap();

    let keyless = NewsApiClient::direct(Client::new(), "http://127.0.0.1:9", None);
    assert!(matches!(keyless.search(&query).await, Err(Error::Config(_))));

    let proxied = NewsApiClient::proxied(Client::new(), "http://127.0.0.1:9");
    assert!(matches!(proxied.search(&query).await, Err(Error::Config(_))));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let client = NewsApiClient::direct(Client::new(), &server.uri(), Some("news-key".into()));
    match client.search(&query).await {
        Err(Error::Upstream { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_raw_headlines_keep_the_provider_body() {
    let server = MockServer::start().await;
    let mut body = headline_body();
    body["articles"][1].as_object_mut().unwrap().remove("publishedAt");
    body["extra"] = json!({"cursor": 7});
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let client = NewsApiClient::direct(Client::new(), &server.uri(), Some("news-key".into()));
    let query = HeadlineQuery::new(None, 1, 10, "us").unwrap();
    let raw = client.request_headlines_raw(&query).await.unwrap();

    assert_eq!(raw, body);
    assert!(raw["articles"][1]["description"].is_null());
}
