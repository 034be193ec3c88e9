//! Credential-holding pass-through routes for the headlines and completion
//! providers, plus their CORS preflight answers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use nh_core::{synthetic, Error, HeadlineQuery, HeadlinesResponse, DEFAULT_COUNTRY};

use crate::error::{json_error, ApiError};
use crate::AppState;

/// Page size used when a proxy caller does not ask for one.
pub const DEFAULT_PROXY_PAGE_SIZE: u32 = 10;

const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsParams {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub country: Option<String>,
}

fn allow_origin(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"))
}

fn cors_headers(headers: &HeaderMap, methods: &'static str) -> [(HeaderName, HeaderValue); 4] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin(headers)),
        (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(methods)),
        (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS)),
        (ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true")),
    ]
}

pub async fn news_preflight(headers: HeaderMap) -> impl IntoResponse {
    (StatusCode::OK, cors_headers(&headers, "GET, OPTIONS"))
}

pub async fn completion_preflight(headers: HeaderMap) -> impl IntoResponse {
    (StatusCode::OK, cors_headers(&headers, "POST, OPTIONS"))
}

/// `GET /api/news`
///
/// A successful upstream body is relayed as received. A failed upstream call
/// still answers 200, with `status: "error"` and a synthetic page in place of
/// the provider's articles.
pub async fn news(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<NewsParams>, QueryRejection>,
) -> Response {
    let cors = cors_headers(&headers, "GET, OPTIONS");
    if state.config.news_api_key.is_none() {
        return (cors, json_error(StatusCode::INTERNAL_SERVER_ERROR, "News API key not configured")).into_response();
    }

    let query = match params
        .map_err(|e| Error::Validation(e.body_text()))
        .and_then(|Query(params)| headline_query(params))
    {
        Ok(query) => query,
        Err(e) => return (cors, ApiError(e)).into_response(),
    };

    match state.news.request_headlines_raw(&query).await {
        Ok(body) => (cors, Json(body)).into_response(),
        Err(e) => {
            error!("Error proxying request to News API: {}", e);
            warn!("Answering news proxy page {} with synthetic articles", query.page);
            let fallback = HeadlinesResponse::error(
                e.to_string(),
                synthetic::raw_articles(query.category.as_deref(), query.page, query.page_size),
            );
            (StatusCode::OK, cors, Json(fallback)).into_response()
        }
    }
}

fn headline_query(params: NewsParams) -> nh_core::Result<HeadlineQuery> {
    HeadlineQuery::new(
        params.category.filter(|category| !category.is_empty()),
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PROXY_PAGE_SIZE),
        params.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
    )
}

/// `POST /api/openrouter`
///
/// Relays the body verbatim and answers with the provider's own status and JSON.
pub async fn completion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let cors = cors_headers(&headers, "POST, OPTIONS");
    let Some(api_key) = state.config.openrouter_api_key.as_deref() else {
        return (cors, json_error(StatusCode::INTERNAL_SERVER_ERROR, "OpenRouter API key not configured"))
            .into_response();
    };
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) => return (cors, ApiError(Error::Validation(e.body_text()))).into_response(),
    };

    let referer = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(state.config.referer.as_str());
    debug!("Forwarding completion request with referer {}", referer);

    match forward_completion(&state, api_key, referer, &body).await {
        Ok((status, reply)) => (status, cors, Json(reply)).into_response(),
        Err(e) => {
            error!("Error proxying request to OpenRouter: {}", e);
            (cors, json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())).into_response()
        }
    }
}

async fn forward_completion(
    state: &AppState,
    api_key: &str,
    referer: &str,
    body: &Value,
) -> nh_core::Result<(StatusCode, Value)> {
    let url = format!("{}/chat/completions", state.config.openrouter_url.trim_end_matches('/'));
    let response = state
        .http
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("HTTP-Referer", referer)
        .header("X-Title", &state.config.app_title)
        .json(body)
        .send()
        .await?;

    // reqwest and axum sit on different `http` versions.
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let reply: Value = response.json().await?;
    if !status.is_success() {
        error!("OpenRouter API error ({}): {}", status, reply);
    }
    Ok((status, reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_query_defaults() {
        let query = headline_query(NewsParams::default()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PROXY_PAGE_SIZE);
        assert_eq!(query.country, "us");
        assert_eq!(query.category, None);

        let params = NewsParams {
            category: Some(String::new()),
            ..NewsParams::default()
        };
        assert_eq!(headline_query(params).unwrap().category, None);
    }

    #[test]
    fn test_headline_query_rejects_out_of_range() {
        let params = NewsParams {
            page_size: Some(500),
            ..NewsParams::default()
        };
        assert!(matches!(headline_query(params), Err(Error::Validation(_))));
    }

    #[test]
    fn test_allow_origin_mirrors_caller() {
        let mut headers = HeaderMap::new();
        assert_eq!(allow_origin(&headers), "*");
        headers.insert(ORIGIN, HeaderValue::from_static("https://reader.example"));
        assert_eq!(allow_origin(&headers), "https://reader.example");
    }
}
