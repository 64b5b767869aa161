//! Booking checkout, retrieval, and payment confirmation.
//!
//! Payment processing itself is external; this service only records the
//! collaborator's outcome, moving payment status from pending to paid (which
//! confirms the booking) or failed.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use wayfarer_core::models::{Booking, BookingStatus, Caller, NewBooking, PaymentStatus};
use wayfarer_core::AppError;
use wayfarer_db::{BookingStore, TourStore};

use crate::access::AccessPolicy;

/// Outcome reported by the external payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    tours: Arc<dyn TourStore>,
    access: AccessPolicy,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        tours: Arc<dyn TourStore>,
        access: AccessPolicy,
    ) -> Self {
        Self {
            bookings,
            tours,
            access,
        }
    }

    /// Create a booking at checkout. Payment starts pending; the application
    /// sub-record is only populated after payment lands.
    #[tracing::instrument(skip(self, caller, new), fields(user_id = %caller.user_id))]
    pub async fn checkout(&self, caller: &Caller, mut new: NewBooking) -> Result<Booking, AppError> {
        if new.number_of_travelers < 1 {
            return Err(AppError::Validation(
                "Number of travelers must be at least 1".to_string(),
            ));
        }
        if new.customer_name.trim().is_empty() {
            return Err(AppError::Validation("Customer name is required".to_string()));
        }
        if new.customer_email.trim().is_empty() {
            return Err(AppError::Validation(
                "Customer email is required".to_string(),
            ));
        }
        self.tours
            .get(new.tour_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

        // the booking is always owned by the authenticated caller
        new.user_id = Some(caller.user_id);
        self.bookings.insert(new).await
    }

    /// Fetch a booking the caller may access.
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn get_booking(&self, caller: &Caller, booking_id: Uuid) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        self.access.authorize_booking(caller, &booking).await?;
        Ok(booking)
    }

    /// List bookings: admins see all, customers their own.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn list_bookings(&self, caller: &Caller) -> Result<Vec<Booking>, AppError> {
        if caller.is_admin() {
            return self.bookings.list_all().await;
        }
        let email = caller.email.as_deref().unwrap_or_default();
        self.bookings.list_for_user(caller.user_id, email).await
    }

    /// Record the payment collaborator's outcome. Only a pending payment can
    /// transition; a successful payment confirms the booking.
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn record_payment(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        outcome: PaymentOutcome,
    ) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        self.access.authorize_booking(caller, &booking).await?;

        if booking.payment_status != PaymentStatus::Pending {
            return Err(AppError::Validation(format!(
                "Payment is already {} and cannot be updated",
                booking.payment_status
            )));
        }

        let (payment_status, booking_status) = match outcome {
            PaymentOutcome::Paid => (PaymentStatus::Paid, BookingStatus::Confirmed),
            PaymentOutcome::Failed => (PaymentStatus::Failed, BookingStatus::Pending),
        };
        self.bookings
            .set_payment_status(booking.id, payment_status, booking_status)
            .await
    }
}
