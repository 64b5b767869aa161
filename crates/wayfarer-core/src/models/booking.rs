//! Booking: a purchased tour reservation by a main applicant, optionally
//! accompanied by dependants. Carries the main applicant's visa application
//! and document set, plus the booking-level application-closed gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::application::{ApplicationStatus, VisaApplication};
use super::document::DocumentSet;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(AppError::Internal(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(AppError::Internal(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

/// Fields supplied at checkout to create a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tour_id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub number_of_travelers: i32,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub tour_id: Uuid,
    /// Normalized owner id; `None` for guest checkouts, which rely on the
    /// customer-email fallback in the access check.
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub number_of_travelers: i32,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    pub special_requests: Option<String>,
    // Application-process gate
    pub application_closed: bool,
    pub application_closed_at: Option<DateTime<Utc>>,
    pub application_closed_by: Option<Uuid>,
    // Main applicant
    pub application: VisaApplication,
    pub documents: DocumentSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The closed gate blocks every non-admin application mutation for this
    /// booking and its dependants, regardless of individual status.
    pub fn ensure_process_open(&self, is_admin: bool) -> Result<(), AppError> {
        if self.application_closed && !is_admin {
            return Err(AppError::process_closed());
        }
        Ok(())
    }

    /// Dependant slots still free given the current dependant count:
    /// the main applicant always occupies one of `number_of_travelers`.
    pub fn remaining_dependant_slots(&self, dependant_count: i64) -> i64 {
        i64::from(self.number_of_travelers) - 1 - dependant_count
    }

    /// Close the application process; stamps who and when together.
    pub fn close_applications(&mut self, closed_by: Uuid, now: DateTime<Utc>) {
        self.application_closed = true;
        self.application_closed_at = Some(now);
        self.application_closed_by = Some(closed_by);
    }

    /// Reopen the application process; clears both stamps together.
    pub fn reopen_applications(&mut self) {
        self.application_closed = false;
        self.application_closed_at = None;
        self.application_closed_by = None;
    }
}

/// Booking as returned to API clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub number_of_travelers: i32,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    pub special_requests: Option<String>,
    pub application_closed: bool,
    pub application_status: ApplicationStatus,
    pub application_number: Option<String>,
    pub application_form_submitted: bool,
    pub application_form_submitted_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id,
            tour_id: booking.tour_id,
            customer_name: booking.customer_name,
            customer_email: booking.customer_email,
            customer_phone: booking.customer_phone,
            number_of_travelers: booking.number_of_travelers,
            payment_status: booking.payment_status,
            booking_status: booking.booking_status,
            booking_date: booking.booking_date,
            special_requests: booking.special_requests,
            application_closed: booking.application_closed,
            application_status: booking.application.status(),
            application_number: booking.application.application_number.clone(),
            application_form_submitted: booking.application.form_submitted,
            application_form_submitted_at: booking.application.form_submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(travelers: i32) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            customer_name: "Ada Obi".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_phone: None,
            number_of_travelers: travelers,
            payment_status: PaymentStatus::Paid,
            booking_status: BookingStatus::Confirmed,
            booking_date: Utc::now(),
            special_requests: None,
            application_closed: false,
            application_closed_at: None,
            application_closed_by: None,
            application: VisaApplication::default(),
            documents: DocumentSet::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn process_gate_blocks_non_admin_only() {
        let mut b = booking(2);
        assert!(b.ensure_process_open(false).is_ok());

        b.close_applications(Uuid::new_v4(), Utc::now());
        assert!(matches!(
            b.ensure_process_open(false),
            Err(AppError::ProcessClosed(_))
        ));
        assert!(b.ensure_process_open(true).is_ok());
        assert!(b.application_closed_at.is_some());
        assert!(b.application_closed_by.is_some());

        b.reopen_applications();
        assert!(b.ensure_process_open(false).is_ok());
        assert!(b.application_closed_at.is_none());
        assert!(b.application_closed_by.is_none());
    }

    #[test]
    fn remaining_slots_account_for_main_applicant() {
        let b = booking(3);
        assert_eq!(b.remaining_dependant_slots(0), 2);
        assert_eq!(b.remaining_dependant_slots(2), 0);
        assert_eq!(b.remaining_dependant_slots(3), -1);
    }

    #[test]
    fn response_reflects_application_state() {
        let mut b = booking(2);
        b.application.status = Some(ApplicationStatus::Submitted);
        b.application.form_submitted = true;
        b.application.application_number = Some("250314000001".to_string());

        let resp = BookingResponse::from(b);
        assert_eq!(resp.application_status, ApplicationStatus::Submitted);
        assert!(resp.application_form_submitted);
        assert_eq!(resp.application_number.as_deref(), Some("250314000001"));
    }
}
