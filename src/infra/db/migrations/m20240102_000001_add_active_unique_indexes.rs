//! Migration: Email and CPF are unique among active (non-deleted) users.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Partial indexes are not expressible through the index builder.
const CREATE_EMAIL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_users_email_active ON users (email) WHERE deleted_at IS NULL";
const CREATE_CPF_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_users_cpf_active ON users (cpf) WHERE deleted_at IS NULL";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CREATE_EMAIL_INDEX).await?;
        db.execute_unprepared(CREATE_CPF_INDEX).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP INDEX IF EXISTS uq_users_cpf_active")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS uq_users_email_active")
            .await?;
        Ok(())
    }
}
