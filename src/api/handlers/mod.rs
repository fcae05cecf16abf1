//! HTTP request handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserResponse;

pub mod auth_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use user_handler::user_routes;

/// `{"user": {...}}` response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}
