//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, user_handler, UserEnvelope};
use crate::domain::UserResponse;
use crate::errors::{ErrorResponse, FieldError};
use crate::services::TokenResponse;

/// OpenAPI documentation for the Rust Auth Starter
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rust Auth Starter",
        version = "0.1.0",
        description = "User registration and token authentication with Axum and SeaORM",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        // User endpoints
        user_handler::get_current_user,
    ),
    components(
        schemas(
            UserResponse,
            UserEnvelope,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            TokenResponse,
            ErrorResponse,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "Authenticated user operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /login or /refresh"))
                        .build(),
                ),
            );
        }
    }
}
