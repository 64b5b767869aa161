//! End-to-end lifecycle scenario across the services, against the in-memory
//! stores: roster capacity, passport validation, submission stamping, and
//! the admin notification.

use std::sync::Arc;

use chrono::{Months, Utc};

use wayfarer_core::models::{ApplicationStatus, DependantDraft};
use wayfarer_core::AppError;

use crate::access::AccessPolicy;
use crate::application::ApplicationService;
use crate::dependants::DependantRosterService;
use crate::test_helpers::{
    fixtures, InMemoryBookingStore, InMemoryDependantStore, InMemoryProfileStore,
    InMemoryTourStore, InMemoryUserDirectory, MockStorage, RecordingNotifier,
};

#[tokio::test]
async fn full_booking_lifecycle() {
    let bookings = InMemoryBookingStore::new();
    let dependants = InMemoryDependantStore::new(bookings.clone());
    let tours = InMemoryTourStore::new();
    let notifier = RecordingNotifier::new();
    let access = AccessPolicy::new(Arc::new(InMemoryUserDirectory::new()));

    let applications = ApplicationService::new(
        Arc::new(bookings.clone()),
        Arc::new(dependants.clone()),
        Arc::new(tours.clone()),
        access.clone(),
        Arc::new(notifier.clone()),
    );
    let roster = DependantRosterService::new(
        Arc::new(bookings.clone()),
        Arc::new(dependants.clone()),
        Arc::new(InMemoryProfileStore::new()),
        access,
        Arc::new(MockStorage::new()),
    );

    // a paid two-traveler booking with an open application process
    let mut booking = fixtures::paid_booking(2);
    let tour = fixtures::tour("Maasai Mara Adventure");
    booking.tour_id = tour.id;
    tours.add(tour);
    bookings.add(booking.clone());
    let caller = fixtures::owner_of(&booking);

    // one dependant fits (1 main + 1 dependant = 2 travelers)
    let jane = roster
        .add_dependant(
            &caller,
            booking.id,
            DependantDraft {
                name: Some("Jane Doe".to_string()),
                relationship: Some("Spouse".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(jane.name, "Jane Doe");

    // a second dependant would make three travelers and is rejected
    let err = roster
        .add_dependant(
            &caller,
            booking.id,
            DependantDraft {
                name: Some("Sam Doe".to_string()),
                relationship: Some("Child".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("0 slot(s) remaining"));

    // a passport expiring in five months fails the six-month rule
    let now = Utc::now();
    let mut short_form = fixtures::valid_form(now);
    short_form.passport_expiry_date = Some(now.date_naive() + Months::new(5));
    let err = applications
        .submit_main(&caller, booking.id, short_form)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("6 months"));
    assert!(notifier.sent().is_empty());

    // resubmitting with seven months of validity succeeds and stamps everything
    let mut good_form = fixtures::valid_form(now);
    good_form.passport_expiry_date = Some(now.date_naive() + Months::new(7));
    let submitted = applications
        .submit_main(&caller, booking.id, good_form)
        .await
        .unwrap();
    assert_eq!(submitted.application.status(), ApplicationStatus::Submitted);
    assert!(submitted.application.form_submitted_at.is_some());
    assert!(submitted.application.application_number.is_some());

    // the admin notification fired exactly once
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tour_title, "Maasai Mara Adventure");
    assert_eq!(sent[0].applicant_email, booking.customer_email);
}
