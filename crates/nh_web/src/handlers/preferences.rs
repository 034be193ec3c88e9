use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use nh_core::{Error, PreferenceSet};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

/// Lists are optional on the wire; a missing one is rejected by `into_preference_set`.
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesBody {
    pub topics: Option<BTreeSet<String>>,
    pub keywords: Option<BTreeSet<String>>,
    pub sources: Option<BTreeSet<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub preferences: Option<PreferencesBody>,
}

impl PreferencesRequest {
    fn into_preference_set(self) -> Option<PreferenceSet> {
        let body = self.preferences?;
        Some(PreferenceSet {
            topics: body.topics?,
            keywords: body.keywords?,
            sources: body.sources?,
        })
    }
}

/// `GET /api/preferences`
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let preferences = state.preferences.get_preferences(&user_id).await?;
    Ok(Json(json!({ "preferences": preferences })))
}

/// `POST /api/preferences`
pub async fn set_preferences(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<PreferencesRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let preferences = body
        .ok()
        .and_then(|Json(request)| request.into_preference_set())
        .ok_or_else(|| ApiError(Error::Validation("Invalid preferences format".to_string())))?;

    state.preferences.set_preferences(&user_id, preferences).await?;
    info!("Stored preferences for {}", user_id);
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_body_is_rejected() {
        let request: PreferencesRequest =
            serde_json::from_str(r#"{"preferences":{"topics":["science"],"keywords":[]}}"#).unwrap();
        assert!(request.into_preference_set().is_none());

        let request: PreferencesRequest = serde_json::from_str("{}").unwrap();
        assert!(request.into_preference_set().is_none());
    }

    #[test]
    fn test_complete_body_converts() {
        let request: PreferencesRequest = serde_json::from_str(
            r#"{"preferences":{"topics":["science"],"keywords":["mars"],"sources":[]}}"#,
        )
        .unwrap();
        let set = request.into_preference_set().unwrap();
        assert!(set.topics.contains("science"));
        assert!(set.sources.is_empty());
    }
}
