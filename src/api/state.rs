//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::infra::{Database, UserRepository};
use crate::services::{ServiceContainer, Services, TokenService, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Token issuing and verification
    pub token_service: Arc<dyn TokenService>,
    /// User registration, authentication and lookups
    pub user_service: Arc<dyn UserService>,
    /// Database handle, when one is attached (used by `/health`)
    pub database: Option<Arc<Database>>,
    /// Per-request deadline
    pub request_timeout: Duration,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self::from_container(&container, config).with_database(database)
    }

    /// Create application state over an arbitrary user repository.
    pub fn from_repository(repo: Arc<dyn UserRepository>, config: &Config) -> Self {
        let container = Services::from_repository(repo, config);

        Self::from_container(&container, config)
    }

    /// Create new application state with manually injected services.
    pub fn new(token_service: Arc<dyn TokenService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            token_service,
            user_service,
            database: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Attach a database for health checks.
    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    /// Override the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn from_container(container: &impl ServiceContainer, config: &Config) -> Self {
        Self::new(container.tokens(), container.users())
            .with_request_timeout(config.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenSettings;
    use crate::infra::MockUserRepository;
    use crate::services::{MockServiceContainer, TokenIssuer, UserManager};

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            db_max_connections: 1,
            db_min_connections: 1,
            tokens: TokenSettings::new(
                "access-secret-with-at-least-32-chars!",
                "refresh-secret-with-at-least-32-chars",
                600,
                7200,
            )
            .unwrap(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            request_timeout: Duration::from_secs(7),
        }
    }

    #[test]
    fn test_state_takes_services_from_container() {
        let config = config();
        let tokens = TokenIssuer::new(&config.tokens);

        let mut container = MockServiceContainer::new();
        container
            .expect_tokens()
            .times(1)
            .return_once(move || Arc::new(tokens) as Arc<dyn TokenService>);
        container.expect_users().times(1).return_once(|| {
            Arc::new(UserManager::new(Arc::new(MockUserRepository::new()))) as Arc<dyn UserService>
        });

        let state = AppState::from_container(&container, &config);

        assert_eq!(state.token_service.access_ttl_secs(), 600);
        assert_eq!(state.request_timeout, Duration::from_secs(7));
        assert!(state.database.is_none());
    }
}
