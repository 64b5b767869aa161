use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use wayfarer_core::models::Tour;
use wayfarer_core::AppError;

use crate::stores::TourStore;

/// Read-only repository for tour packages.
#[derive(Clone)]
pub struct TourRepository {
    pool: PgPool,
}

impl TourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TourStore for TourRepository {
    #[tracing::instrument(skip(self), fields(db.table = "tours", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Tour>, AppError> {
        let tour = sqlx::query_as::<Postgres, Tour>("SELECT * FROM tours WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tour)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tours", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Tour>, AppError> {
        let tours = sqlx::query_as::<Postgres, Tour>("SELECT * FROM tours ORDER BY title ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tours)
    }
}
