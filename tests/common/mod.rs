//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use rust_auth_starter::api::{create_router, AppState};
use rust_auth_starter::config::{Config, ERR_MSG_CPF_IN_USE, ERR_MSG_EMAIL_IN_USE};
use rust_auth_starter::domain::{NewIdentity, User};
use rust_auth_starter::errors::{AppError, AppResult};
use rust_auth_starter::infra::UserRepository;

pub const ACCESS_SECRET: &str = "access-secret-with-at-least-32-chars!";
pub const REFRESH_SECRET: &str = "refresh-secret-with-at-least-32-chars";

/// In-memory user directory enforcing the same uniqueness rules as the store
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn soft_delete(&self, id: Uuid) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.deleted_at = Some(chrono::Utc::now());
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id && u.is_active()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email == email && u.is_active())
            .cloned())
    }

    async fn find_by_cpf(&self, cpf: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.cpf == cpf && u.is_active()).cloned())
    }

    async fn create(&self, identity: NewIdentity) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();

        if users
            .iter()
            .any(|u| u.is_active() && u.email == identity.email)
        {
            return Err(AppError::conflict(ERR_MSG_EMAIL_IN_USE));
        }
        if users.iter().any(|u| u.is_active() && u.cpf == identity.cpf) {
            return Err(AppError::conflict(ERR_MSG_CPF_IN_USE));
        }

        let user = User::new(
            Uuid::new_v4(),
            identity.full_name,
            identity.email,
            identity.cpf,
            identity.age,
            identity.password_hash,
        );
        users.push(user.clone());
        Ok(user)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "ACCESS_SECRET" => Some(ACCESS_SECRET.to_string()),
        "REFRESH_SECRET" => Some(REFRESH_SECRET.to_string()),
        _ => None,
    })
    .unwrap()
}

/// Router over a fresh in-memory directory
pub fn build_app() -> (Router, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::default());
    let state = AppState::from_repository(repo.clone(), &test_config());
    (create_router(state), repo)
}
