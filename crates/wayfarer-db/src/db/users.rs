use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use wayfarer_core::models::{Role, User};
use wayfarer_core::AppError;

use crate::stores::UserDirectory;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_model(self) -> Result<User, AppError> {
        let role = match self.role.as_str() {
            "admin" => Role::Admin,
            "customer" => Role::Customer,
            other => {
                return Err(AppError::Internal(format!("Unknown user role: {}", other)));
            }
        };
        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            created_at: self.created_at,
        })
    }
}

/// Repository over the user directory. Account management lives in the
/// external identity service; this side only reads.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_model).transpose()
    }
}
