use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use wayfarer_core::models::{
    Booking, BookingStatus, DocumentSet, NewBooking, PaymentStatus, VisaApplication,
};
use wayfarer_core::AppError;

use super::embedded::{
    documents_to_json, form_to_json, ApplicationColumns, DocumentColumns,
};
use crate::stores::BookingStore;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub number_of_travelers: i32,
    pub payment_status: String,
    pub booking_status: String,
    pub booking_date: DateTime<Utc>,
    pub special_requests: Option<String>,
    pub application_closed: bool,
    pub application_closed_at: Option<DateTime<Utc>>,
    pub application_closed_by: Option<Uuid>,
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

impl BookingRow {
    pub(crate) fn into_model(self) -> Result<Booking, AppError> {
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

        Ok(Booking {
            id: self.id,
            tour_id: self.tour_id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            number_of_travelers: self.number_of_travelers,
            payment_status: self.payment_status.parse()?,
            booking_status: self.booking_status.parse()?,
            booking_date: self.booking_date,
            special_requests: self.special_requests,
            application_closed: self.application_closed,
            application_closed_at: self.application_closed_at,
            application_closed_by: self.application_closed_by,
            application,
            documents,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for bookings and their embedded main-applicant sub-records.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn rows_to_models(rows: Vec<BookingRow>) -> Result<Vec<Booking>, AppError> {
        rows.into_iter().map(BookingRow::into_model).collect()
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "bookings", db.operation = "insert"))]
    async fn insert(&self, new: NewBooking) -> Result<Booking, AppError> {
        if new.number_of_travelers < 1 {
            return Err(AppError::Validation(
                "Number of travelers must be at least 1".to_string(),
            ));
        }

        let row = sqlx::query_as::<Postgres, BookingRow>(
            r#"
            INSERT INTO bookings (
                tour_id, user_id, customer_name, customer_email, customer_phone,
                number_of_travelers, special_requests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.tour_id)
        .bind(new.user_id)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .bind(new.number_of_travelers)
        .bind(&new.special_requests)
        .fetch_one(&self.pool)
        .await?;

        row.into_model()
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query_as::<Postgres, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookingRow::into_model).transpose()
    }

    #[tracing::instrument(skip(self, email), fields(db.table = "bookings", db.operation = "select"))]
    async fn list_for_user(&self, user_id: Uuid, email: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<Postgres, BookingRow>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1 OR customer_email = $2
            ORDER BY booking_date DESC
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Self::rows_to_models(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select"))]
    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<Postgres, BookingRow>(
            "SELECT * FROM bookings ORDER BY booking_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Self::rows_to_models(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "update", db.record_id = %id))]
    async fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        booking_status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let row = sqlx::query_as::<Postgres, BookingRow>(
            r#"
            UPDATE bookings
            SET payment_status = $2, booking_status = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_status.to_string())
        .bind(booking_status.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        row.into_model()
    }

    #[tracing::instrument(skip(self, application), fields(db.table = "bookings", db.operation = "update", db.record_id = %id))]
    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
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
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, documents), fields(db.table = "bookings", db.operation = "update", db.record_id = %id))]
    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError> {
        let personal = documents
            .personal_passport_picture
            .as_ref()
            .map(super::embedded::document_to_json)
            .transpose()?;
        let international = documents
            .international_passport
            .as_ref()
            .map(super::embedded::document_to_json)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
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
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, booking), fields(db.table = "bookings", db.operation = "update", db.record_id = %booking.id))]
    async fn update_process_gate(&self, booking: &Booking) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET application_closed = $2,
                application_closed_at = $3,
                application_closed_by = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.application_closed)
        .bind(booking.application_closed_at)
        .bind(booking.application_closed_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }
}
