//! Application form lifecycle: Submit, Patch, Review, and the booking-level
//! process gate, for both the main applicant and dependants.
//!
//! Every operation loads the record, runs the access check, enforces the
//! closed gate and terminal lock, applies the transition in memory, and
//! persists the whole sub-record. The admin notification on a first
//! submission is fire-and-forget: failures are logged and never fail the
//! Submit.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use wayfarer_core::models::{
    new_application_number, ApplicationForm, ApplicationFormPatch, Booking, Caller, Dependant,
    ReviewDecision, SubmitOutcome,
};
use wayfarer_core::AppError;
use wayfarer_db::{BookingStore, DependantStore, TourStore};

use crate::access::AccessPolicy;
use crate::notify::{AdminNotification, AdminNotifier, ApplicantKind};

/// Close or reopen a booking's application process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessGateAction {
    Close,
    Reopen,
}

#[derive(Clone)]
pub struct ApplicationService {
    bookings: Arc<dyn BookingStore>,
    dependants: Arc<dyn DependantStore>,
    tours: Arc<dyn TourStore>,
    access: AccessPolicy,
    notifier: Arc<dyn AdminNotifier>,
}

impl ApplicationService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        dependants: Arc<dyn DependantStore>,
        tours: Arc<dyn TourStore>,
        access: AccessPolicy,
        notifier: Arc<dyn AdminNotifier>,
    ) -> Self {
        Self {
            bookings,
            dependants,
            tours,
            access,
            notifier,
        }
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, AppError> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    async fn load_dependant(&self, dependant_id: Uuid) -> Result<Dependant, AppError> {
        self.dependants
            .get(dependant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))
    }

    async fn tour_title(&self, tour_id: Uuid) -> String {
        match self.tours.get(tour_id).await {
            Ok(Some(tour)) => tour.title,
            _ => "(unknown tour)".to_string(),
        }
    }

    async fn send_notification(&self, notification: AdminNotification) {
        if let Err(e) = self.notifier.notify_admin(notification.clone()).await {
            tracing::warn!(
                error = %e,
                booking_id = %notification.booking_id,
                "Failed to send admin notification for application submission"
            );
        }
    }

    /// Submit the main applicant's form.
    #[tracing::instrument(skip(self, caller, form), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn submit_main(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        form: ApplicationForm,
    ) -> Result<Booking, AppError> {
        let mut booking = self.load_booking(booking_id).await?;
        self.access.authorize_booking(caller, &booking).await?;
        booking.ensure_process_open(caller.is_admin())?;

        let now = Utc::now();
        let outcome = booking
            .application
            .submit(form, now, || new_application_number(now))?;
        self.bookings
            .update_application(booking.id, &booking.application)
            .await?;

        if outcome == SubmitOutcome::FirstSubmission {
            let notification = AdminNotification {
                applicant_kind: ApplicantKind::MainApplicant,
                booking_id: booking.id,
                dependant_id: None,
                applicant_name: booking.customer_name.clone(),
                applicant_email: booking.customer_email.clone(),
                tour_title: self.tour_title(booking.tour_id).await,
            };
            self.send_notification(notification).await;
        }

        Ok(booking)
    }

    /// Patch the main applicant's form.
    #[tracing::instrument(skip(self, caller, patch), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn patch_main(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        patch: ApplicationFormPatch,
    ) -> Result<Booking, AppError> {
        let mut booking = self.load_booking(booking_id).await?;
        self.access.authorize_booking(caller, &booking).await?;
        booking.ensure_process_open(caller.is_admin())?;

        booking.application.patch(&patch)?;
        self.bookings
            .update_application(booking.id, &booking.application)
            .await?;
        Ok(booking)
    }

    /// Review the main applicant's application (admin only).
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn review_main(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<Booking, AppError> {
        self.access.require_admin(caller)?;
        let mut booking = self.load_booking(booking_id).await?;

        booking.application.review(decision, caller.user_id, Utc::now());
        self.bookings
            .update_application(booking.id, &booking.application)
            .await?;
        Ok(booking)
    }

    /// Submit a dependant's form.
    #[tracing::instrument(skip(self, caller, form), fields(dependant_id = %dependant_id, user_id = %caller.user_id))]
    pub async fn submit_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
        form: ApplicationForm,
    ) -> Result<Dependant, AppError> {
        let mut dependant = self.load_dependant(dependant_id).await?;
        self.access.authorize_dependant(caller, &dependant)?;
        let booking = self.load_booking(dependant.booking_id).await?;
        booking.ensure_process_open(caller.is_admin())?;

        let now = Utc::now();
        let outcome = dependant
            .application
            .submit(form, now, || new_application_number(now))?;
        self.dependants
            .update_application(dependant.id, &dependant.application)
            .await?;

        if outcome == SubmitOutcome::FirstSubmission {
            let notification = AdminNotification {
                applicant_kind: ApplicantKind::Dependant,
                booking_id: booking.id,
                dependant_id: Some(dependant.id),
                applicant_name: dependant.name.clone(),
                applicant_email: booking.customer_email.clone(),
                tour_title: self.tour_title(booking.tour_id).await,
            };
            self.send_notification(notification).await;
        }

        Ok(dependant)
    }

    /// Patch a dependant's form.
    #[tracing::instrument(skip(self, caller, patch), fields(dependant_id = %dependant_id, user_id = %caller.user_id))]
    pub async fn patch_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
        patch: ApplicationFormPatch,
    ) -> Result<Dependant, AppError> {
        let mut dependant = self.load_dependant(dependant_id).await?;
        self.access.authorize_dependant(caller, &dependant)?;
        let booking = self.load_booking(dependant.booking_id).await?;
        booking.ensure_process_open(caller.is_admin())?;

        dependant.application.patch(&patch)?;
        self.dependants
            .update_application(dependant.id, &dependant.application)
            .await?;
        Ok(dependant)
    }

    /// Review a dependant's application (admin only).
    #[tracing::instrument(skip(self, caller), fields(dependant_id = %dependant_id, user_id = %caller.user_id))]
    pub async fn review_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<Dependant, AppError> {
        self.access.require_admin(caller)?;
        let mut dependant = self.load_dependant(dependant_id).await?;

        dependant
            .application
            .review(decision, caller.user_id, Utc::now());
        self.dependants
            .update_application(dependant.id, &dependant.application)
            .await?;
        Ok(dependant)
    }

    /// Close or reopen a booking's application process (admin only).
    /// Closing stamps when and by whom; reopening clears both together.
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn set_process_gate(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        action: ProcessGateAction,
    ) -> Result<Booking, AppError> {
        self.access.require_admin(caller)?;
        let mut booking = self.load_booking(booking_id).await?;

        match action {
            ProcessGateAction::Close => booking.close_applications(caller.user_id, Utc::now()),
            ProcessGateAction::Reopen => booking.reopen_applications(),
        }
        self.bookings.update_process_gate(&booking).await?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        fixtures, InMemoryBookingStore, InMemoryDependantStore, InMemoryTourStore,
        InMemoryUserDirectory, RecordingNotifier,
    };
    use chrono::Months;
    use wayfarer_core::models::ApplicationStatus;

    struct Harness {
        bookings: InMemoryBookingStore,
        dependants: InMemoryDependantStore,
        tours: InMemoryTourStore,
        notifier: RecordingNotifier,
        service: ApplicationService,
    }

    fn harness() -> Harness {
        let bookings = InMemoryBookingStore::new();
        let dependants = InMemoryDependantStore::new(bookings.clone());
        let tours = InMemoryTourStore::new();
        let notifier = RecordingNotifier::new();
        let access = AccessPolicy::new(Arc::new(InMemoryUserDirectory::new()));
        let service = ApplicationService::new(
            Arc::new(bookings.clone()),
            Arc::new(dependants.clone()),
            Arc::new(tours.clone()),
            access,
            Arc::new(notifier.clone()),
        );
        Harness {
            bookings,
            dependants,
            tours,
            notifier,
            service,
        }
    }

    #[tokio::test]
    async fn first_submission_stamps_and_notifies_once() {
        let h = harness();
        let mut booking = fixtures::paid_booking(2);
        let tour = fixtures::tour("Serengeti Safari");
        booking.tour_id = tour.id;
        h.tours.add(tour);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let updated = h
            .service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap();

        assert_eq!(updated.application.status(), ApplicationStatus::Submitted);
        assert!(updated.application.form_submitted);
        assert!(updated.application.application_number.is_some());

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].applicant_kind, ApplicantKind::MainApplicant);
        assert_eq!(sent[0].tour_title, "Serengeti Safari");

        // resubmission: same timestamp, no second notification
        let first_at = updated.application.form_submitted_at;
        let again = h
            .service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap();
        assert_eq!(again.application.form_submitted_at, first_at);
        assert_eq!(h.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_does_not_fail_submit() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        h.notifier.set_fail(true);
        let caller = fixtures::owner_of(&booking);

        let updated = h
            .service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap();
        assert_eq!(updated.application.status(), ApplicationStatus::Submitted);
    }

    #[tokio::test]
    async fn expired_passport_is_rejected_and_nothing_persists() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let now = Utc::now();
        let mut form = fixtures::valid_form(now);
        form.passport_expiry_date = Some(now.date_naive() + Months::new(5));

        let err = h
            .service
            .submit_main(&caller, booking.id, form)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("6 months"));

        let stored = h.bookings.snapshot(booking.id).unwrap();
        assert!(!stored.application.form_submitted);
        assert_eq!(stored.application.status(), ApplicationStatus::Pending);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn closed_process_blocks_non_admin_but_not_admin() {
        let h = harness();
        let mut booking = fixtures::paid_booking(3);
        booking.close_applications(Uuid::new_v4(), Utc::now());
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessClosed(_)));

        let err = h
            .service
            .patch_main(&caller, booking.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessClosed(_)));

        // admin bypasses the gate
        let admin = fixtures::admin();
        assert!(h
            .service
            .submit_main(&admin, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn terminal_application_locks_submit_and_patch() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);
        let admin = fixtures::admin();

        h.service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap();
        h.service
            .review_main(&admin, booking.id, ReviewDecision::Rejected)
            .await
            .unwrap();

        let before = h.bookings.snapshot(booking.id).unwrap();
        let err = h
            .service
            .submit_main(&caller, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReviewed(_)));

        let err = h
            .service
            .patch_main(&caller, booking.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReviewed(_)));

        // even the admin cannot modify a reviewed application
        let err = h
            .service
            .submit_main(&admin, booking.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReviewed(_)));

        let after = h.bookings.snapshot(booking.id).unwrap();
        assert_eq!(after.application.form, before.application.form);
        assert_eq!(after.application.status(), ApplicationStatus::Rejected);
    }

    #[tokio::test]
    async fn review_requires_admin_and_stamps_reviewer() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .review_main(&caller, booking.id, ReviewDecision::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let admin = fixtures::admin();
        let updated = h
            .service
            .review_main(&admin, booking.id, ReviewDecision::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.application.status(), ApplicationStatus::Accepted);
        assert_eq!(updated.application.reviewed_by, Some(admin.user_id));
        assert!(updated.application.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn dependant_submission_gated_by_owning_booking() {
        let h = harness();
        let mut booking = fixtures::paid_booking(3);
        booking.close_applications(Uuid::new_v4(), Utc::now());
        h.bookings.add(booking.clone());
        let dependant = fixtures::dependant(&booking, "Jane Doe", "Spouse");
        h.dependants.add(dependant.clone());

        let caller = fixtures::owner_of(&booking);
        let err = h
            .service
            .submit_dependant(&caller, dependant.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessClosed(_)));

        // reopen, then the dependant's first submission notifies as dependant
        let admin = fixtures::admin();
        h.service
            .set_process_gate(&admin, booking.id, ProcessGateAction::Reopen)
            .await
            .unwrap();
        let updated = h
            .service
            .submit_dependant(&caller, dependant.id, fixtures::valid_form(Utc::now()))
            .await
            .unwrap();
        assert_eq!(updated.application.status(), ApplicationStatus::Submitted);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].applicant_kind, ApplicantKind::Dependant);
        assert_eq!(sent[0].dependant_id, Some(dependant.id));
    }

    #[tokio::test]
    async fn gate_stamps_are_set_and_cleared_together() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let admin = fixtures::admin();

        let closed = h
            .service
            .set_process_gate(&admin, booking.id, ProcessGateAction::Close)
            .await
            .unwrap();
        assert!(closed.application_closed);
        assert!(closed.application_closed_at.is_some());
        assert_eq!(closed.application_closed_by, Some(admin.user_id));

        let reopened = h
            .service
            .set_process_gate(&admin, booking.id, ProcessGateAction::Reopen)
            .await
            .unwrap();
        assert!(!reopened.application_closed);
        assert!(reopened.application_closed_at.is_none());
        assert!(reopened.application_closed_by.is_none());

        let caller = fixtures::owner_of(&booking);
        let err = h
            .service
            .set_process_gate(&caller, booking.id, ProcessGateAction::Close)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
