//! Protected user handlers.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use uuid::Uuid;

use super::UserEnvelope;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::{AppError, AppResult, ErrorResponse};

/// Create routes that require an access token
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserEnvelope>> {
    let id = Uuid::parse_str(&current_user.id).map_err(|_| AppError::InvalidToken)?;
    let user = state.user_service.get_user(id).await?;

    Ok(Json(UserEnvelope { user: user.into() }))
}
