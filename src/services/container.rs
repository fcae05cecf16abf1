//! Service Container - Centralized service access.
//!
//! Services are built once at startup and shared across request tasks
//! through `Arc`.

use std::sync::Arc;

use super::{TokenIssuer, TokenService, UserManager, UserService};
use crate::config::Config;
use crate::infra::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get token service
    fn tokens(&self) -> Arc<dyn TokenService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    token_service: Arc<dyn TokenService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(token_service: Arc<dyn TokenService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            token_service,
            user_service,
        }
    }

    /// Wire services over an arbitrary user repository
    pub fn from_repository(repo: Arc<dyn UserRepository>, config: &Config) -> Self {
        Self {
            token_service: Arc::new(TokenIssuer::new(&config.tokens)),
            user_service: Arc::new(UserManager::new(repo)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: Arc<sea_orm::DatabaseConnection>, config: &Config) -> Self {
        Self::from_repository(Arc::new(UserStore::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn tokens(&self) -> Arc<dyn TokenService> {
        self.token_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
