//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_SCHEME;
use crate::errors::{AppError, AppResult};

/// Authenticated identity extracted from the access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    /// Identity ID, as carried in the token subject
    pub id: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// An absent or empty header is `MissingHeader`. Otherwise the value must
/// split on single spaces into exactly the scheme and a non-empty token.
pub fn extract_bearer(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingHeader)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;
    if value.is_empty() {
        return Err(AppError::MissingHeader);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => Ok(*token),
        _ => Err(AppError::InvalidToken),
    }
}

/// Access token authentication middleware.
///
/// Verifies the bearer token and injects the `CurrentUser` into the request
/// extensions. On failure the inner handler never runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;
    let claims = state.token_service.verify_access(token)?;

    request
        .extensions_mut()
        .insert(CurrentUser { id: claims.sub });

    Ok(next.run(request).await)
}
