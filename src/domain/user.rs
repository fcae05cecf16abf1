//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    /// Digits only
    pub cpf: String,
    pub age: i32,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh, active user from validated parts.
    pub fn new(
        id: Uuid,
        full_name: String,
        email: String,
        cpf: String,
        age: i32,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name,
            email,
            cpf,
            age,
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Registration candidate, before validation and hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub cpf: String,
    pub age: i32,
    pub password: String,
}

/// A validated identity ready for the store. The password is already hashed
/// and the CPF normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub full_name: String,
    pub email: String,
    pub cpf: String,
    pub age: i32,
    pub password_hash: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Maria Silva")]
    pub full_name: String,
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// National ID, digits only
    #[schema(example = "15245901854")]
    pub cpf: String,
    #[schema(example = 30)]
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            cpf: user.cpf,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            Uuid::new_v4(),
            "Maria Silva".to_string(),
            "maria@example.com".to_string(),
            "15245901854".to_string(),
            30,
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        )
    }

    #[test]
    fn test_new_user_is_active() {
        let user = sample();
        assert!(user.is_active());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let mut user = sample();
        user.deleted_at = Some(Utc::now());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["cpf"], "15245901854");
    }

    #[test]
    fn test_response_drops_hash() {
        let user = sample();
        let id = user.id;
        let response = UserResponse::from(user);

        assert_eq!(response.id, id);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("argon2"));
    }
}
