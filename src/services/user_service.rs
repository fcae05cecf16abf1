//! User service - Registration, credential checks and lookups.
//!
//! Composes the identity validator, the password hasher and the user
//! repository.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_cpf, validate_identity, NewIdentity, NewUser, Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
///
/// Lookups exclude soft-deleted users.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate, hash and persist a new user
    async fn register(&self, candidate: NewUser) -> AppResult<User>;

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password are indistinguishable.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Get active user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Get active user by email
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Get active user by CPF, punctuated or bare
    async fn get_user_by_cpf(&self, cpf: &str) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, candidate: NewUser) -> AppResult<User> {
        validate_identity(&candidate.email, &candidate.cpf, candidate.age)?;

        let password_hash = Password::new_blocking(candidate.password)
            .await?
            .into_string();

        let user = self
            .repo
            .create(NewIdentity {
                full_name: candidate.full_name,
                email: candidate.email,
                cpf: normalize_cpf(&candidate.cpf),
                age: candidate.age,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self.repo.find_by_email(email).await?;

        let verified = match &user {
            Some(user) => {
                Password::from_hash(user.password_hash.clone())
                    .verify_blocking(password.to_string())
                    .await?
            }
            None => {
                let password = password.to_string();
                tokio::task::spawn_blocking(move || Password::verify_dummy(&password))
                    .await
                    .map_err(|e| AppError::internal(format!("Password verify task failed: {}", e)))?
            }
        };

        match user {
            Some(user) if verified => Ok(user),
            _ => {
                tracing::info!("Login rejected: invalid credentials");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.repo.find_by_email(email).await?.ok_or_not_found()
    }

    async fn get_user_by_cpf(&self, cpf: &str) -> AppResult<User> {
        self.repo
            .find_by_cpf(&normalize_cpf(cpf))
            .await?
            .ok_or_not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldError;
    use crate::infra::MockUserRepository;
    use mockall::predicate::eq;

    fn candidate() -> NewUser {
        NewUser {
            full_name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            cpf: "152.459.018-54".to_string(),
            age: 30,
            password: "secret123".to_string(),
        }
    }

    fn stored_user(password: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "Maria Silva".to_string(),
            "maria@example.com".to_string(),
            "15245901854".to_string(),
            30,
            Password::new(password).unwrap().into_string(),
        )
    }

    #[tokio::test]
    async fn test_register_normalizes_and_hashes() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|identity| {
                identity.cpf == "15245901854"
                    && identity.password_hash.starts_with("$argon2id$")
                    && Password::from_hash(identity.password_hash.clone()).verify("secret123")
            })
            .times(1)
            .returning(|identity| {
                Ok(User::new(
                    Uuid::new_v4(),
                    identity.full_name,
                    identity.email,
                    identity.cpf,
                    identity.age,
                    identity.password_hash,
                ))
            });

        let service = UserManager::new(Arc::new(repo));
        let user = service.register(candidate()).await.unwrap();

        assert_eq!(user.cpf, "15245901854");
        assert_ne!(user.password_hash, "secret123");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_cpf_before_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().times(0);

        let service = UserManager::new(Arc::new(repo));
        let mut bad = candidate();
        bad.cpf = "111.111.111-11".to_string();

        match service.register(bad).await.unwrap_err() {
            AppError::Validation(fields) => {
                assert_eq!(fields, vec![FieldError::new("cpf", "invalid CPF")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_propagates_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(AppError::conflict("email is already in use")));

        let service = UserManager::new(Arc::new(repo));
        let err = service.register(candidate()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(msg) if msg == "email is already in use"));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let user = stored_user("secret123");
        let id = user.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("maria@example.com"))
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserManager::new(Arc::new(repo));
        let found = service
            .authenticate("maria@example.com", "secret123")
            .await
            .unwrap();

        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_email_match() {
        let user = stored_user("secret123");

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("maria@example.com"))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_find_by_email()
            .with(eq("ghost@example.com"))
            .returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo));

        let wrong = service
            .authenticate("maria@example.com", "not-it-at-all")
            .await
            .unwrap_err();
        let unknown = service
            .authenticate("ghost@example.com", "secret123")
            .await
            .unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo));
        let result = service.get_user(id).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_user_by_cpf_normalizes_lookup() {
        let user = stored_user("secret123");

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_cpf()
            .with(eq("15245901854"))
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserManager::new(Arc::new(repo));
        let found = service.get_user_by_cpf("152.459.018-54").await.unwrap();

        assert_eq!(found.cpf, "15245901854");
    }

    #[tokio::test]
    async fn test_get_user_by_email_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo));
        let result = service.get_user_by_email("nobody@example.com").await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
