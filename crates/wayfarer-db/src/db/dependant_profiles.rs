use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use wayfarer_core::models::{DependantProfile, NewDependantProfile};
use wayfarer_core::AppError;

use crate::stores::DependantProfileStore;

/// Repository for per-user dependant templates.
#[derive(Clone)]
pub struct DependantProfileRepository {
    pool: PgPool,
}

impl DependantProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DependantProfileStore for DependantProfileRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "dependant_profiles", db.operation = "insert"))]
    async fn create(
        &self,
        user_id: Uuid,
        new: NewDependantProfile,
    ) -> Result<DependantProfile, AppError> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("Profile name is required".to_string()));
        }
        if new.relationship.trim().is_empty() {
            return Err(AppError::Validation(
                "Profile relationship is required".to_string(),
            ));
        }

        let profile = sqlx::query_as::<Postgres, DependantProfile>(
            r#"
            INSERT INTO dependant_profiles (
                user_id, name, relationship, date_of_birth, passport_number, nationality, gender
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.relationship)
        .bind(new.date_of_birth)
        .bind(&new.passport_number)
        .bind(&new.nationality)
        .bind(&new.gender)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependant_profiles", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<DependantProfile>, AppError> {
        let profile = sqlx::query_as::<Postgres, DependantProfile>(
            "SELECT * FROM dependant_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependant_profiles", db.operation = "select", user_id = %user_id))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DependantProfile>, AppError> {
        let profiles = sqlx::query_as::<Postgres, DependantProfile>(
            "SELECT * FROM dependant_profiles WHERE user_id = $1 ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependant_profiles", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM dependant_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dependant profile not found".to_string()));
        }
        Ok(())
    }
}
