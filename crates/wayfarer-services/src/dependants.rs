//! Dependant roster management: adding and removing secondary travelers on
//! a booking.
//!
//! Adds require a paid booking, an open application process (unless the
//! caller is admin), and a free traveler slot. The capacity check and the
//! insert are atomic in the store, so concurrent adds against the same
//! booking cannot both pass the check. Profile templates are copied into the
//! new dependant with explicitly-supplied fields taking precedence.

use std::sync::Arc;

use uuid::Uuid;

use wayfarer_core::models::{Booking, Caller, Dependant, DependantDraft, PaymentStatus};
use wayfarer_core::AppError;
use wayfarer_db::{BookingStore, DependantProfileStore, DependantStore};
use wayfarer_storage::Storage;

use crate::access::AccessPolicy;

#[derive(Clone)]
pub struct DependantRosterService {
    bookings: Arc<dyn BookingStore>,
    dependants: Arc<dyn DependantStore>,
    profiles: Arc<dyn DependantProfileStore>,
    access: AccessPolicy,
    storage: Arc<dyn Storage>,
}

impl DependantRosterService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        dependants: Arc<dyn DependantStore>,
        profiles: Arc<dyn DependantProfileStore>,
        access: AccessPolicy,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            bookings,
            dependants,
            profiles,
            access,
            storage,
        }
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, AppError> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Add a dependant to a booking, optionally seeded from a profile
    /// template owned by the caller.
    #[tracing::instrument(skip(self, caller, draft), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn add_dependant(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        draft: DependantDraft,
        profile_ref: Option<Uuid>,
    ) -> Result<Dependant, AppError> {
        let booking = self.load_booking(booking_id).await?;
        self.access.authorize_booking(caller, &booking).await?;

        if booking.payment_status != PaymentStatus::Paid {
            return Err(AppError::Validation(
                "Dependants can only be added after the booking has been paid".to_string(),
            ));
        }
        booking.ensure_process_open(caller.is_admin())?;

        let profile = match profile_ref {
            Some(profile_id) => {
                let profile = self
                    .profiles
                    .get(profile_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Dependant profile not found".to_string())
                    })?;
                if profile.user_id != caller.user_id {
                    return Err(AppError::Forbidden(
                        "This dependant profile does not belong to you".to_string(),
                    ));
                }
                Some(profile)
            }
            None => None,
        };

        let new = draft.resolve(profile.as_ref())?;
        let owner = booking.user_id.unwrap_or(caller.user_id);
        self.dependants
            .create_in_booking(booking.id, owner, &new)
            .await
    }

    /// List a booking's dependants.
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn list_dependants(
        &self,
        caller: &Caller,
        booking_id: Uuid,
    ) -> Result<Vec<Dependant>, AppError> {
        let booking = self.load_booking(booking_id).await?;
        self.access.authorize_booking(caller, &booking).await?;
        self.dependants.list_for_booking(booking.id).await
    }

    /// Remove a dependant, deleting its record and (best-effort) every
    /// document object embedded on it. Removal only frees capacity, so no
    /// re-validation is needed.
    #[tracing::instrument(skip(self, caller), fields(dependant_id = %dependant_id, user_id = %caller.user_id))]
    pub async fn remove_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
    ) -> Result<(), AppError> {
        let dependant = self
            .dependants
            .get(dependant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))?;
        self.access.authorize_dependant(caller, &dependant)?;

        self.dependants.delete(dependant.id).await?;

        for key in dependant.documents.storage_keys() {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(
                    error = %e,
                    storage_key = %key,
                    dependant_id = %dependant.id,
                    "Failed to delete dependant document object from storage"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        fixtures, InMemoryBookingStore, InMemoryDependantStore, InMemoryProfileStore,
        InMemoryUserDirectory, MockStorage,
    };
    use chrono::Utc;
    use wayfarer_core::models::{DocumentSet, DocumentType, Role, TravelDocument};

    struct Harness {
        bookings: InMemoryBookingStore,
        dependants: InMemoryDependantStore,
        profiles: InMemoryProfileStore,
        storage: MockStorage,
        service: DependantRosterService,
    }

    fn harness() -> Harness {
        let bookings = InMemoryBookingStore::new();
        let dependants = InMemoryDependantStore::new(bookings.clone());
        let profiles = InMemoryProfileStore::new();
        let storage = MockStorage::new();
        let access = AccessPolicy::new(Arc::new(InMemoryUserDirectory::new()));
        let service = DependantRosterService::new(
            Arc::new(bookings.clone()),
            Arc::new(dependants.clone()),
            Arc::new(profiles.clone()),
            access,
            Arc::new(storage.clone()),
        );
        Harness {
            bookings,
            dependants,
            profiles,
            storage,
            service,
        }
    }

    fn draft(name: &str, relationship: &str) -> DependantDraft {
        DependantDraft {
            name: Some(name.to_string()),
            relationship: Some(relationship.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn capacity_invariant_counts_the_main_applicant() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        // 1 main + 1 dependant = 2 travelers: the first add fits
        let jane = h
            .service
            .add_dependant(&caller, booking.id, draft("Jane Doe", "Spouse"), None)
            .await
            .unwrap();
        assert_eq!(jane.name, "Jane Doe");

        // the second add exceeds numberOfTravelers and names the free slots
        let err = h
            .service
            .add_dependant(&caller, booking.id, draft("Sam Doe", "Child"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("0 slot(s) remaining"));

        // removal frees the slot again
        h.service.remove_dependant(&caller, jane.id).await.unwrap();
        assert!(h
            .service
            .add_dependant(&caller, booking.id, draft("Sam Doe", "Child"), None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn sequential_fill_to_capacity() {
        let h = harness();
        let booking = fixtures::paid_booking(4);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        for i in 0..3 {
            h.service
                .add_dependant(
                    &caller,
                    booking.id,
                    draft(&format!("Dependant {}", i), "Family"),
                    None,
                )
                .await
                .unwrap();
        }
        let err = h
            .service
            .add_dependant(&caller, booking.id, draft("One Too Many", "Family"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("0 slot(s) remaining"));
    }

    #[tokio::test]
    async fn unpaid_booking_rejects_dependants() {
        let h = harness();
        let mut booking = fixtures::paid_booking(3);
        booking.payment_status = PaymentStatus::Pending;
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .add_dependant(&caller, booking.id, draft("Jane Doe", "Spouse"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("paid"));
    }

    #[tokio::test]
    async fn closed_process_blocks_non_admin_adds() {
        let h = harness();
        let mut booking = fixtures::paid_booking(3);
        booking.close_applications(Uuid::new_v4(), Utc::now());
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .add_dependant(&caller, booking.id, draft("Jane Doe", "Spouse"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessClosed(_)));

        let admin = fixtures::admin();
        assert!(h
            .service
            .add_dependant(&admin, booking.id, draft("Jane Doe", "Spouse"), None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn profile_template_is_copied_with_overrides() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let profile = h
            .profiles
            .create(
                caller.user_id,
                wayfarer_core::models::NewDependantProfile {
                    name: "Jane Doe".to_string(),
                    relationship: "Spouse".to_string(),
                    date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 5, 1),
                    passport_number: Some("B7654321".to_string()),
                    nationality: Some("Ghanaian".to_string()),
                    gender: Some("female".to_string()),
                },
            )
            .await
            .unwrap();

        let dependant = h
            .service
            .add_dependant(
                &caller,
                booking.id,
                DependantDraft {
                    passport_number: Some("C0000009".to_string()),
                    ..Default::default()
                },
                Some(profile.id),
            )
            .await
            .unwrap();

        assert_eq!(dependant.name, "Jane Doe");
        assert_eq!(dependant.relationship, "Spouse");
        // the explicit override wins over the profile value
        assert_eq!(dependant.passport_number.as_deref(), Some("C0000009"));

        // the profile was copied, not referenced: deleting it later changes nothing
        h.profiles.delete(profile.id).await.unwrap();
        assert!(h.dependants.snapshot(dependant.id).is_some());
    }

    #[tokio::test]
    async fn foreign_profile_is_forbidden() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let other_user = Uuid::new_v4();
        let profile = h
            .profiles
            .create(
                other_user,
                wayfarer_core::models::NewDependantProfile {
                    name: "Someone Else".to_string(),
                    relationship: "Friend".to_string(),
                    date_of_birth: None,
                    passport_number: None,
                    nationality: None,
                    gender: None,
                },
            )
            .await
            .unwrap();

        let err = h
            .service
            .add_dependant(&caller, booking.id, DependantDraft::default(), Some(profile.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_required_fields_fail_validation() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .add_dependant(&caller, booking.id, DependantDraft::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_deletes_embedded_document_objects() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let mut dependant = fixtures::dependant(&booking, "Jane Doe", "Spouse");
        let mut documents = DocumentSet::default();
        documents.attach(TravelDocument {
            id: Uuid::new_v4(),
            name: "passport.jpg".to_string(),
            url: "https://storage.test/dependants/d/passport.jpg".to_string(),
            storage_key: format!("dependants/{}/passport.jpg", dependant.id),
            document_type: DocumentType::InternationalPassport,
            uploaded_at: Utc::now(),
        });
        dependant.documents = documents;
        h.dependants.add(dependant.clone());

        h.service
            .remove_dependant(&caller, dependant.id)
            .await
            .unwrap();

        assert!(h.dependants.snapshot(dependant.id).is_none());
        assert_eq!(
            h.storage.deleted_keys(),
            vec![format!("dependants/{}/passport.jpg", dependant.id)]
        );
    }

    #[tokio::test]
    async fn only_owner_or_admin_can_remove() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let dependant = fixtures::dependant(&booking, "Jane Doe", "Spouse");
        h.dependants.add(dependant.clone());

        let stranger = Caller {
            user_id: Uuid::new_v4(),
            email: None,
            role: Role::Customer,
        };
        let err = h
            .service
            .remove_dependant(&stranger, dependant.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let admin = fixtures::admin();
        h.service
            .remove_dependant(&admin, dependant.id)
            .await
            .unwrap();
    }
}
