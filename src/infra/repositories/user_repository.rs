//! User repository implementation with soft delete support.
//!
//! The store is the authority for email and CPF uniqueness. Registration
//! re-checks both inside a transaction and the partial unique indexes on
//! active rows settle any race between concurrent inserts.

use async_trait::async_trait;
use std::sync::Arc;

use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, QueryFilter, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{ERR_MSG_CPF_IN_USE, ERR_MSG_EMAIL_IN_USE};
use crate::domain::{NewIdentity, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// All query methods exclude soft-deleted records.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find active user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find active user by normalized CPF
    async fn find_by_cpf(&self, cpf: &str) -> AppResult<Option<User>>;

    /// Persist a new identity.
    ///
    /// # Errors
    /// `Conflict` when the email or CPF already belongs to an active user.
    async fn create(&self, identity: NewIdentity) -> AppResult<User>;
}

/// Concrete implementation of UserRepository backed by SeaORM
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert_unique(txn: &DatabaseTransaction, identity: NewIdentity) -> AppResult<User> {
        let email_taken = UserEntity::find()
            .filter(user::Column::Email.eq(identity.email.as_str()))
            .filter(user::Column::DeletedAt.is_null())
            .one(txn)
            .await?
            .is_some();
        if email_taken {
            return Err(AppError::conflict(ERR_MSG_EMAIL_IN_USE));
        }

        let cpf_taken = UserEntity::find()
            .filter(user::Column::Cpf.eq(identity.cpf.as_str()))
            .filter(user::Column::DeletedAt.is_null())
            .one(txn)
            .await?
            .is_some();
        if cpf_taken {
            return Err(AppError::conflict(ERR_MSG_CPF_IN_USE));
        }

        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(identity.full_name),
            email: Set(identity.email),
            cpf: Set(identity.cpf),
            age: Set(identity.age),
            password_hash: Set(identity.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(txn).await.map_err(map_insert_error)?;
        Ok(User::from(model))
    }
}

/// Map a lost uniqueness race onto the same conflict the pre-check reports.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::conflict(unique_violation_message(&detail))
        }
        _ => AppError::from(err),
    }
}

/// Pick the client message for a unique violation from the driver detail,
/// which names the violated index (`uq_users_cpf_active` or
/// `uq_users_email_active`).
fn unique_violation_message(detail: &str) -> &'static str {
    if detail.to_lowercase().contains("cpf") {
        ERR_MSG_CPF_IN_USE
    } else {
        ERR_MSG_EMAIL_IN_USE
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_cpf(&self, cpf: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Cpf.eq(cpf))
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, identity: NewIdentity) -> AppResult<User> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        // A dropped transaction rolls back, so cancellation leaves no row.
        match Self::insert_unique(&txn, identity).await {
            Ok(user) => {
                txn.commit().await.map_err(map_insert_error)?;
                Ok(user)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
