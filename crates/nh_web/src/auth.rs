use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use nh_core::identity::bearer_token;

use crate::error::ApiError;
use crate::AppState;

/// The caller's user identifier, taken from the bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;
        let user_id = state.identity.resolve(token).await?;
        debug!("Request authenticated as {}", user_id);
        Ok(AuthUser(user_id))
    }
}
