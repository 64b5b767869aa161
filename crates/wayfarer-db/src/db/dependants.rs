use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use wayfarer_core::models::{Dependant, DocumentSet, NewDependant, VisaApplication};
use wayfarer_core::AppError;

use super::embedded::{
    document_to_json, documents_to_json, form_to_json, ApplicationColumns, DocumentColumns,
};
use super::transaction::TransactionGuard;
use crate::stores::DependantStore;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DependantRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub application_form: JsonValue,
    pub application_form_submitted: bool,
    pub application_form_submitted_at: Option<DateTime<Utc>>,
    pub application_status: Option<String>,
    pub application_reviewed_at: Option<DateTime<Utc>>,
    pub application_reviewed_by: Option<Uuid>,
    pub application_number: Option<String>,
    pub personal_passport_picture: Option<JsonValue>,
    pub international_passport: Option<JsonValue>,
    pub supporting_documents: JsonValue,
    pub documents: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DependantRow {
    pub(crate) fn into_model(self) -> Result<Dependant, AppError> {
        let application = ApplicationColumns {
            application_form: self.application_form,
            application_form_submitted: self.application_form_submitted,
            application_form_submitted_at: self.application_form_submitted_at,
            application_status: self.application_status,
            application_reviewed_at: self.application_reviewed_at,
            application_reviewed_by: self.application_reviewed_by,
            application_number: self.application_number,
        }
        .into_application()?;
        let documents = DocumentColumns {
            personal_passport_picture: self.personal_passport_picture,
            international_passport: self.international_passport,
            supporting_documents: self.supporting_documents,
            documents: self.documents,
        }
        .into_document_set()?;

        Ok(Dependant {
            id: self.id,
            booking_id: self.booking_id,
            user_id: self.user_id,
            name: self.name,
            relationship: self.relationship,
            date_of_birth: self.date_of_birth,
            passport_number: self.passport_number,
            application,
            documents,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for dependants and their embedded sub-records.
#[derive(Clone)]
pub struct DependantRepository {
    pool: PgPool,
}

impl DependantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DependantStore for DependantRepository {
    /// Capacity-checked insert. The booking row is locked for the duration
    /// of the transaction so concurrent adds against the same booking
    /// serialize and cannot both pass the count check.
    #[tracing::instrument(skip(self, new), fields(db.table = "dependants", db.operation = "insert", booking_id = %booking_id))]
    async fn create_in_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        new: &NewDependant,
    ) -> Result<Dependant, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let number_of_travelers: i32 = sqlx::query_scalar::<Postgres, i32>(
            "SELECT number_of_travelers FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let dependant_count: i64 = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM dependants WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_one(&mut **tx)
        .await?;

        // main applicant + existing dependants + the new one must fit
        let remaining = i64::from(number_of_travelers) - 1 - dependant_count;
        if remaining < 1 {
            return Err(AppError::no_capacity(remaining.max(0)));
        }

        let row = sqlx::query_as::<Postgres, DependantRow>(
            r#"
            INSERT INTO dependants (
                booking_id, user_id, name, relationship, date_of_birth, passport_number
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.relationship)
        .bind(new.date_of_birth)
        .bind(&new.passport_number)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        row.into_model()
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependants", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Dependant>, AppError> {
        let row = sqlx::query_as::<Postgres, DependantRow>("SELECT * FROM dependants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DependantRow::into_model).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependants", db.operation = "select", booking_id = %booking_id))]
    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Dependant>, AppError> {
        let rows = sqlx::query_as::<Postgres, DependantRow>(
            "SELECT * FROM dependants WHERE booking_id = $1 ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DependantRow::into_model).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependants", db.operation = "select", booking_id = %booking_id))]
    async fn count_for_booking(&self, booking_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM dependants WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self, application), fields(db.table = "dependants", db.operation = "update", db.record_id = %id))]
    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE dependants
            SET application_form = $2,
                application_form_submitted = $3,
                application_form_submitted_at = $4,
                application_status = $5,
                application_reviewed_at = $6,
                application_reviewed_by = $7,
                application_number = $8,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(form_to_json(&application.form)?)
        .bind(application.form_submitted)
        .bind(application.form_submitted_at)
        .bind(application.status.map(|s| s.to_string()))
        .bind(application.reviewed_at)
        .bind(application.reviewed_by)
        .bind(&application.application_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dependant not found".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, documents), fields(db.table = "dependants", db.operation = "update", db.record_id = %id))]
    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError> {
        let personal = documents
            .personal_passport_picture
            .as_ref()
            .map(document_to_json)
            .transpose()?;
        let international = documents
            .international_passport
            .as_ref()
            .map(document_to_json)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE dependants
            SET personal_passport_picture = $2,
                international_passport = $3,
                supporting_documents = $4,
                documents = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(personal)
        .bind(international)
        .bind(documents_to_json(&documents.supporting_documents)?)
        .bind(documents_to_json(&documents.documents)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dependant not found".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "dependants", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM dependants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dependant not found".to_string()));
        }
        Ok(())
    }
}
