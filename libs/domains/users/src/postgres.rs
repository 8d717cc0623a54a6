use async_trait::async_trait;
use sea_orm::{DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM raw statements.
///
/// The users table is narrow and append-mostly, so plain SQL keeps this
/// simpler than a full entity definition.
#[derive(Clone)]
pub struct PgUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.name.clone().into(),
                user.password_hash.clone().into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
                    UserError::DuplicateEmail(user.email.clone())
                } else {
                    UserError::Internal(format!("Database error: {}", e))
                }
            })?
            .ok_or_else(|| UserError::Internal("Failed to create user".to_string()))?;

        tracing::info!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE LOWER(email) = LOWER($1)";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
