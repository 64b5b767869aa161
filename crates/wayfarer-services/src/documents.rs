//! Document slot management: attach and detach travel documents on bookings
//! and dependants.
//!
//! Fixed slots (personal passport picture, international passport) hold one
//! document each; attaching over an occupied slot deletes the old object
//! from the store first (best-effort) and replaces the slot. Supporting
//! documents require a name and append to an ordered list. The legacy
//! unified list is mirrored here, in exactly one place.
//!
//! Upload failures abort the attach; object-store delete failures are logged
//! and never block the record mutation. A crash between the old-object
//! delete and the row update can therefore leave a slot pointing at a
//! deleted object; this is an accepted limitation of the slot-replacement
//! ordering.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use wayfarer_core::models::{Caller, DocumentSet, DocumentType, TravelDocument};
use wayfarer_core::AppError;
use wayfarer_db::{BookingStore, DependantStore};
use wayfarer_storage::Storage;

use crate::access::AccessPolicy;

/// An incoming document payload.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentLifecycleService {
    bookings: Arc<dyn BookingStore>,
    dependants: Arc<dyn DependantStore>,
    access: AccessPolicy,
    storage: Arc<dyn Storage>,
}

/// Strip path separators and oddities from a client-supplied filename.
fn safe_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

impl DocumentLifecycleService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        dependants: Arc<dyn DependantStore>,
        access: AccessPolicy,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            bookings,
            dependants,
            access,
            storage,
        }
    }

    /// Delete an object from the store, logging (not propagating) failures.
    async fn delete_object_best_effort(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            tracing::warn!(
                error = %e,
                storage_key = %storage_key,
                "Failed to delete document object from storage"
            );
        }
    }

    /// Upload the payload and build the document value. Upload failure is
    /// fatal to the attach.
    async fn store_document(
        &self,
        folder: &str,
        document_type: DocumentType,
        name: Option<String>,
        upload: DocumentUpload,
    ) -> Result<TravelDocument, AppError> {
        let display_name = match document_type {
            DocumentType::SupportingDocument => name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation(
                        "A name is required for supporting documents".to_string(),
                    )
                })?,
            _ => name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| safe_filename(&upload.filename)),
        };

        let object_name = format!("{}-{}", Uuid::new_v4(), safe_filename(&upload.filename));
        let stored = self
            .storage
            .upload(folder, &object_name, &upload.content_type, upload.data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(TravelDocument {
            id: Uuid::new_v4(),
            name: display_name,
            url: stored.url,
            storage_key: stored.key,
            document_type,
            uploaded_at: Utc::now(),
        })
    }

    /// Attach the document in memory and clean up a replaced slot occupant.
    async fn attach_into(&self, documents: &mut DocumentSet, document: TravelDocument) {
        if let Some(replaced) = documents.attach(document) {
            self.delete_object_best_effort(&replaced.storage_key).await;
        }
    }

    /// Attach a document to a booking's main applicant.
    #[tracing::instrument(skip(self, caller, upload), fields(booking_id = %booking_id, user_id = %caller.user_id, document_type = %document_type))]
    pub async fn attach_to_booking(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        document_type: DocumentType,
        name: Option<String>,
        upload: DocumentUpload,
    ) -> Result<TravelDocument, AppError> {
        let mut booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        self.access.authorize_booking(caller, &booking).await?;

        let folder = format!("bookings/{}", booking.id);
        let document = self
            .store_document(&folder, document_type, name, upload)
            .await?;
        self.attach_into(&mut booking.documents, document.clone())
            .await;
        self.bookings
            .update_documents(booking.id, &booking.documents)
            .await?;
        Ok(document)
    }

    /// Detach a document (by id or storage key) from a booking.
    #[tracing::instrument(skip(self, caller), fields(booking_id = %booking_id, user_id = %caller.user_id))]
    pub async fn detach_from_booking(
        &self,
        caller: &Caller,
        booking_id: Uuid,
        reference: &str,
    ) -> Result<(), AppError> {
        let mut booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        self.access.authorize_booking(caller, &booking).await?;

        let (removed, _) = booking.documents.detach(reference)?;
        self.delete_object_best_effort(&removed.storage_key).await;
        self.bookings
            .update_documents(booking.id, &booking.documents)
            .await?;
        Ok(())
    }

    /// Attach a document to a dependant.
    #[tracing::instrument(skip(self, caller, upload), fields(dependant_id = %dependant_id, user_id = %caller.user_id, document_type = %document_type))]
    pub async fn attach_to_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
        document_type: DocumentType,
        name: Option<String>,
        upload: DocumentUpload,
    ) -> Result<TravelDocument, AppError> {
        let mut dependant = self
            .dependants
            .get(dependant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))?;
        self.access.authorize_dependant(caller, &dependant)?;

        let folder = format!("dependants/{}", dependant.id);
        let document = self
            .store_document(&folder, document_type, name, upload)
            .await?;
        self.attach_into(&mut dependant.documents, document.clone())
            .await;
        self.dependants
            .update_documents(dependant.id, &dependant.documents)
            .await?;
        Ok(document)
    }

    /// Detach a document (by id or storage key) from a dependant.
    #[tracing::instrument(skip(self, caller), fields(dependant_id = %dependant_id, user_id = %caller.user_id))]
    pub async fn detach_from_dependant(
        &self,
        caller: &Caller,
        dependant_id: Uuid,
        reference: &str,
    ) -> Result<(), AppError> {
        let mut dependant = self
            .dependants
            .get(dependant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))?;
        self.access.authorize_dependant(caller, &dependant)?;

        let (removed, _) = dependant.documents.detach(reference)?;
        self.delete_object_best_effort(&removed.storage_key).await;
        self.dependants
            .update_documents(dependant.id, &dependant.documents)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        fixtures, InMemoryBookingStore, InMemoryDependantStore, InMemoryUserDirectory, MockStorage,
    };

    struct Harness {
        bookings: InMemoryBookingStore,
        dependants: InMemoryDependantStore,
        storage: MockStorage,
        service: DocumentLifecycleService,
    }

    fn harness() -> Harness {
        let bookings = InMemoryBookingStore::new();
        let dependants = InMemoryDependantStore::new(bookings.clone());
        let storage = MockStorage::new();
        let access = AccessPolicy::new(Arc::new(InMemoryUserDirectory::new()));
        let service = DocumentLifecycleService::new(
            Arc::new(bookings.clone()),
            Arc::new(dependants.clone()),
            access,
            Arc::new(storage.clone()),
        );
        Harness {
            bookings,
            dependants,
            storage,
            service,
        }
    }

    fn upload(filename: &str) -> DocumentUpload {
        DocumentUpload {
            filename: filename.to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn slot_replacement_deletes_old_object_and_keeps_history() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let first = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::PersonalPassportPicture,
                None,
                upload("photo-v1.jpg"),
            )
            .await
            .unwrap();
        let second = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::PersonalPassportPicture,
                None,
                upload("photo-v2.jpg"),
            )
            .await
            .unwrap();

        let stored = h.bookings.snapshot(booking.id).unwrap();
        // one occupant in the slot, both entries in the legacy mirror
        assert_eq!(
            stored.documents.personal_passport_picture.as_ref().map(|d| d.id),
            Some(second.id)
        );
        assert_eq!(stored.documents.documents.len(), 2);
        // the replaced object was deleted from the store
        assert_eq!(h.storage.deleted_keys(), vec![first.storage_key]);
    }

    #[tokio::test]
    async fn slot_replacement_survives_store_delete_failure() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        h.service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::InternationalPassport,
                None,
                upload("passport-v1.jpg"),
            )
            .await
            .unwrap();
        h.storage.set_fail_deletes(true);

        let second = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::InternationalPassport,
                None,
                upload("passport-v2.jpg"),
            )
            .await
            .unwrap();

        let stored = h.bookings.snapshot(booking.id).unwrap();
        assert_eq!(
            stored.documents.international_passport.as_ref().map(|d| d.id),
            Some(second.id)
        );
    }

    #[tokio::test]
    async fn upload_failure_aborts_attach() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        h.storage.set_fail_uploads(true);
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::PersonalPassportPicture,
                None,
                upload("photo.jpg"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        let stored = h.bookings.snapshot(booking.id).unwrap();
        assert!(stored.documents.personal_passport_picture.is_none());
        assert!(stored.documents.documents.is_empty());
    }

    #[tokio::test]
    async fn supporting_document_requires_name() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::SupportingDocument,
                None,
                upload("statement.pdf"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // nothing was uploaded for the failed attach
        assert!(h.storage.uploaded_keys().is_empty());

        let doc = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::SupportingDocument,
                Some("Bank statement".to_string()),
                upload("statement.pdf"),
            )
            .await
            .unwrap();
        assert_eq!(doc.name, "Bank statement");

        let stored = h.bookings.snapshot(booking.id).unwrap();
        assert_eq!(stored.documents.supporting_documents.len(), 1);
    }

    #[tokio::test]
    async fn detach_removes_and_deletes_object() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let doc = h
            .service
            .attach_to_booking(
                &caller,
                booking.id,
                DocumentType::SupportingDocument,
                Some("Invitation letter".to_string()),
                upload("letter.pdf"),
            )
            .await
            .unwrap();

        h.service
            .detach_from_booking(&caller, booking.id, &doc.id.to_string())
            .await
            .unwrap();

        let stored = h.bookings.snapshot(booking.id).unwrap();
        assert!(stored.documents.supporting_documents.is_empty());
        assert!(h.storage.deleted_keys().contains(&doc.storage_key));
    }

    #[tokio::test]
    async fn detach_unknown_document_is_not_found() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let caller = fixtures::owner_of(&booking);

        let err = h
            .service
            .detach_from_booking(&caller, booking.id, &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn stranger_cannot_touch_documents() {
        let h = harness();
        let booking = fixtures::paid_booking(2);
        h.bookings.add(booking.clone());
        let stranger = Caller {
            user_id: Uuid::new_v4(),
            email: Some("other@example.com".to_string()),
            role: wayfarer_core::models::Role::Customer,
        };

        let err = h
            .service
            .attach_to_booking(
                &stranger,
                booking.id,
                DocumentType::PersonalPassportPicture,
                None,
                upload("photo.jpg"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn dependant_documents_attach_and_detach() {
        let h = harness();
        let booking = fixtures::paid_booking(3);
        h.bookings.add(booking.clone());
        let dependant = fixtures::dependant(&booking, "Jane Doe", "Spouse");
        h.dependants.add(dependant.clone());
        let caller = fixtures::owner_of(&booking);

        let doc = h
            .service
            .attach_to_dependant(
                &caller,
                dependant.id,
                DocumentType::InternationalPassport,
                None,
                upload("jane-passport.jpg"),
            )
            .await
            .unwrap();
        assert!(doc.storage_key.starts_with(&format!("dependants/{}", dependant.id)));

        h.service
            .detach_from_dependant(&caller, dependant.id, &doc.storage_key)
            .await
            .unwrap();
        let stored = h.dependants.snapshot(dependant.id).unwrap();
        assert!(stored.documents.international_passport.is_none());
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(safe_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(safe_filename("my photo.jpg"), "my_photo.jpg");
        assert_eq!(safe_filename("///"), "document");
    }
}
