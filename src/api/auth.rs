use axum::{
    Extension, Form, Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, TokenResponse};
use crate::constants::auth::TOKEN_TYPE;
use crate::models::User;

// ============================================================================
// Request Types
// ============================================================================

/// OAuth2 password-flow form body.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// The user resolved from the bearer token, placed in request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub type Authenticated = Extension<CurrentUser>;

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>`, verifies it and loads the user it
/// names. Every failure is the same 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(&headers) else {
        tracing::debug!("Rejected request without bearer token");
        return Err(ApiError::invalid_credentials());
    };

    let user = state.auth.resolve_bearer(token).await.map_err(|e| {
        if e.is_bad_token() {
            tracing::debug!("Rejected bearer token: {e}");
        }
        ApiError::from(e)
    })?;

    tracing::Span::current().record("user_id", user.login.as_str());
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Token from an `Authorization` header with a case-insensitive `Bearer` scheme.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /login
/// Exchange form-encoded credentials for an access token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state
        .auth
        .login(&form.username, &form.password)
        .await
        .map_err(|e| {
            if e.is_bad_credentials() {
                tracing::info!(login = %form.username, "Failed login attempt: {e}");
            }
            ApiError::from(e)
        })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}
