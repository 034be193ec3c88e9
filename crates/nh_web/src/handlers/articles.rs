use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use nh_core::{synthetic, EnrichedArticle, Error};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    #[serde(default)]
    pub article_id: Option<String>,
}

/// A bookmarked article with its detail view.
#[derive(Debug, Serialize)]
pub struct SavedArticle {
    #[serde(flatten)]
    pub article: EnrichedArticle,
    pub saved_id: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SavedArticles {
    pub articles: Vec<SavedArticle>,
}

fn required_article_id(body: Result<Json<ArticleRequest>, JsonRejection>) -> Result<String, ApiError> {
    body.ok()
        .and_then(|Json(request)| request.article_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError(Error::Validation("Article ID is required".to_string())))
}

/// `POST /api/articles/save`
pub async fn save_article(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let article_id = required_article_id(body)?;
    let record = state.saved.save(&user_id, &article_id).await?;
    info!("User {} saved {}", user_id, article_id);
    Ok(Json(json!({ "success": true, "savedId": record.id })))
}

/// `DELETE /api/articles/save`
pub async fn unsave_article(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let article_id = required_article_id(body)?;
    state.saved.remove(&user_id, &article_id).await?;
    info!("User {} removed {}", user_id, article_id);
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/articles/saved`
pub async fn list_saved(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SavedArticles>, ApiError> {
    let articles = state
        .saved
        .list_for(&user_id)
        .await?
        .into_iter()
        .map(|record| SavedArticle {
            article: synthetic::saved_article_details(&record.article_id),
            saved_id: record.id,
            saved_at: record.created_at,
        })
        .collect();
    Ok(Json(SavedArticles { articles }))
}
