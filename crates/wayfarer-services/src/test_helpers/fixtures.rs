//! Shared fixtures for service tests.

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use wayfarer_core::models::{
    ApplicationForm, Booking, BookingStatus, Caller, Dependant, DocumentSet, PaymentStatus, Role,
    Tour, User, VisaApplication,
};

/// A paid, confirmed booking with an open application process.
pub fn paid_booking(number_of_travelers: i32) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        tour_id: Uuid::new_v4(),
        user_id: Some(Uuid::new_v4()),
        customer_name: "Ada Obi".to_string(),
        customer_email: "ada.obi@example.com".to_string(),
        customer_phone: Some("+2348012345678".to_string()),
        number_of_travelers,
        payment_status: PaymentStatus::Paid,
        booking_status: BookingStatus::Confirmed,
        booking_date: now,
        special_requests: None,
        application_closed: false,
        application_closed_at: None,
        application_closed_by: None,
        application: VisaApplication::default(),
        documents: DocumentSet::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn dependant(booking: &Booking, name: &str, relationship: &str) -> Dependant {
    let now = Utc::now();
    Dependant {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        user_id: booking.user_id.unwrap_or_else(Uuid::new_v4),
        name: name.to_string(),
        relationship: relationship.to_string(),
        date_of_birth: None,
        passport_number: None,
        application: VisaApplication::default(),
        documents: DocumentSet::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn user(role: Role, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: "Test User".to_string(),
        role,
        created_at: Utc::now(),
    }
}

pub fn tour(title: &str) -> Tour {
    Tour {
        id: Uuid::new_v4(),
        title: title.to_string(),
        destination: "Zanzibar".to_string(),
        duration_days: 7,
        price_cents: 250_000,
        created_at: Utc::now(),
    }
}

/// Caller owning the given booking (by id).
pub fn owner_of(booking: &Booking) -> Caller {
    Caller {
        user_id: booking.user_id.expect("booking fixture has an owner"),
        email: Some(booking.customer_email.clone()),
        role: Role::Customer,
    }
}

pub fn admin() -> Caller {
    Caller {
        user_id: Uuid::new_v4(),
        email: None,
        role: Role::Admin,
    }
}

/// A complete form whose passport comfortably satisfies the six-month rule.
pub fn valid_form(now: DateTime<Utc>) -> ApplicationForm {
    ApplicationForm {
        nationality: Some("Nigerian".to_string()),
        surname: Some("Obi".to_string()),
        first_name: Some("Ada".to_string()),
        gender: Some("female".to_string()),
        marital_status: Some("single".to_string()),
        date_of_birth: now.date_naive().checked_sub_months(Months::new(12 * 30)),
        passport_number: Some("A01234567".to_string()),
        passport_expiry_date: Some(now.date_naive() + Months::new(18)),
        residential_address: Some("12 Marina Road".to_string()),
        city: Some("Lagos".to_string()),
        country_of_residence: Some("Nigeria".to_string()),
        ..Default::default()
    }
}
