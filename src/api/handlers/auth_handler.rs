//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::UserEnvelope;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{NewUser, UserResponse};
use crate::errors::{AppResult, ErrorResponse};
use crate::services::TokenResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Full name
    #[validate(length(min = 2, max = 100, message = "full_name must be between 2 and 100 characters"))]
    #[schema(example = "Maria Silva", min_length = 2, max_length = 100)]
    pub full_name: String,
    /// Email address
    #[validate(email(message = "invalid email"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// National ID (CPF), punctuated or bare
    #[validate(length(min = 1, message = "cpf is required"))]
    #[schema(example = "152.459.018-54")]
    pub cpf: String,
    /// Age in years
    #[validate(range(min = 18, max = 150, message = "age must be between 18 and 150"))]
    #[schema(example = 30, minimum = 18, maximum = 150)]
    pub age: i32,
    /// Password (minimum 6 characters)
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[schema(example = "secret123", min_length = 6)]
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            cpf: req.cpf,
            age: req.age,
            password: req.password,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// Password
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token from a previous login or refresh
    #[validate(length(min = 1, message = "refresh_token is required"))]
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserEnvelope),
        (status = 400, description = "Malformed JSON body", body = ErrorResponse),
        (status = 409, description = "Email or CPF already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserEnvelope>)> {
    let user = state.user_service.register(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: UserResponse::from(user),
        }),
    ))
}

/// Login and get a token pair
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let pair = state.token_service.issue_pair(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse::new(
        pair,
        state.token_service.access_ttl_secs(),
    )))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.token_service.refresh_pair(&payload.refresh_token)?;

    Ok(Json(TokenResponse::new(
        pair,
        state.token_service.access_ttl_secs(),
    )))
}
