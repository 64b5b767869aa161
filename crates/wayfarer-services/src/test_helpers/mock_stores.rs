//! Mock store implementations for testing
//!
//! In-memory implementations of the db store traits, a recording storage
//! backend, and a recording notifier. They mirror the observable behavior of
//! the Postgres repositories, including the capacity-checked dependant
//! insert.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use wayfarer_core::models::{
    Booking, BookingStatus, Dependant, DependantProfile, DocumentSet, NewBooking, NewDependant,
    NewDependantProfile, PaymentStatus, Tour, User, VisaApplication,
};
use wayfarer_core::{AppError, StorageBackend};
use wayfarer_db::{
    BookingStore, DependantProfileStore, DependantStore, TourStore, UserDirectory,
};
use wayfarer_storage::{Storage, StorageError, StorageResult, StoredObject};

use crate::notify::{AdminNotification, AdminNotifier};

/// In-memory booking store.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, booking: Booking) {
        self.bookings.lock().unwrap().insert(booking.id, booking);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Booking> {
        self.bookings.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, new: NewBooking) -> Result<Booking, AppError> {
        if new.number_of_travelers < 1 {
            return Err(AppError::Validation(
                "Number of travelers must be at least 1".to_string(),
            ));
        }
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            tour_id: new.tour_id,
            user_id: new.user_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            number_of_travelers: new.number_of_travelers,
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Pending,
            booking_date: now,
            special_requests: new.special_requests,
            application_closed: false,
            application_closed_at: None,
            application_closed_by: None,
            application: VisaApplication::default(),
            documents: DocumentSet::default(),
            created_at: now,
            updated_at: now,
        };
        self.add(booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.snapshot(id))
    }

    async fn list_for_user(&self, user_id: Uuid, email: &str) -> Result<Vec<Booking>, AppError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == Some(user_id) || b.customer_email == email)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.bookings.lock().unwrap().values().cloned().collect())
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        booking_status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let mut guard = self.bookings.lock().unwrap();
        let booking = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        booking.payment_status = payment_status;
        booking.booking_status = booking_status;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError> {
        let mut guard = self.bookings.lock().unwrap();
        let booking = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        booking.application = application.clone();
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError> {
        let mut guard = self.bookings.lock().unwrap();
        let booking = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        booking.documents = documents.clone();
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn update_process_gate(&self, updated: &Booking) -> Result<(), AppError> {
        let mut guard = self.bookings.lock().unwrap();
        let booking = guard
            .get_mut(&updated.id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        booking.application_closed = updated.application_closed;
        booking.application_closed_at = updated.application_closed_at;
        booking.application_closed_by = updated.application_closed_by;
        booking.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory dependant store. Shares the booking map so the capacity check
/// behaves like the transactional Postgres insert.
#[derive(Clone)]
pub struct InMemoryDependantStore {
    bookings: InMemoryBookingStore,
    dependants: Arc<Mutex<HashMap<Uuid, Dependant>>>,
}

impl InMemoryDependantStore {
    pub fn new(bookings: InMemoryBookingStore) -> Self {
        Self {
            bookings,
            dependants: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add(&self, dependant: Dependant) {
        self.dependants
            .lock()
            .unwrap()
            .insert(dependant.id, dependant);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Dependant> {
        self.dependants.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl DependantStore for InMemoryDependantStore {
    async fn create_in_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        new: &NewDependant,
    ) -> Result<Dependant, AppError> {
        let booking = self
            .bookings
            .snapshot(booking_id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let mut guard = self.dependants.lock().unwrap();
        let count = guard
            .values()
            .filter(|d| d.booking_id == booking_id)
            .count() as i64;
        let remaining = i64::from(booking.number_of_travelers) - 1 - count;
        if remaining < 1 {
            return Err(AppError::no_capacity(remaining.max(0)));
        }

        let now = Utc::now();
        let dependant = Dependant {
            id: Uuid::new_v4(),
            booking_id,
            user_id,
            name: new.name.clone(),
            relationship: new.relationship.clone(),
            date_of_birth: new.date_of_birth,
            passport_number: new.passport_number.clone(),
            application: VisaApplication::default(),
            documents: DocumentSet::default(),
            created_at: now,
            updated_at: now,
        };
        guard.insert(dependant.id, dependant.clone());
        Ok(dependant)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Dependant>, AppError> {
        Ok(self.snapshot(id))
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Dependant>, AppError> {
        let mut list: Vec<Dependant> = self
            .dependants
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.booking_id == booking_id)
            .cloned()
            .collect();
        list.sort_by_key(|d| d.created_at);
        Ok(list)
    }

    async fn count_for_booking(&self, booking_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .dependants
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.booking_id == booking_id)
            .count() as i64)
    }

    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError> {
        let mut guard = self.dependants.lock().unwrap();
        let dependant = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))?;
        dependant.application = application.clone();
        dependant.updated_at = Utc::now();
        Ok(())
    }

    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError> {
        let mut guard = self.dependants.lock().unwrap();
        let dependant = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))?;
        dependant.documents = documents.clone();
        dependant.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.dependants
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Dependant not found".to_string()))
    }
}

/// In-memory dependant profile store.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<Mutex<HashMap<Uuid, DependantProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, profile: DependantProfile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }
}

#[async_trait]
impl DependantProfileStore for InMemoryProfileStore {
    async fn create(
        &self,
        user_id: Uuid,
        new: NewDependantProfile,
    ) -> Result<DependantProfile, AppError> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("Profile name is required".to_string()));
        }
        if new.relationship.trim().is_empty() {
            return Err(AppError::Validation(
                "Profile relationship is required".to_string(),
            ));
        }
        let now = Utc::now();
        let profile = DependantProfile {
            id: Uuid::new_v4(),
            user_id,
            name: new.name,
            relationship: new.relationship,
            date_of_birth: new.date_of_birth,
            passport_number: new.passport_number,
            nationality: new.nationality,
            gender: new.gender,
            created_at: now,
            updated_at: now,
        };
        self.add(profile.clone());
        Ok(profile)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DependantProfile>, AppError> {
        Ok(self.profiles.lock().unwrap().get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DependantProfile>, AppError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.profiles
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Dependant profile not found".to_string()))
    }
}

/// In-memory user directory.
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

/// In-memory tour store.
#[derive(Clone, Default)]
pub struct InMemoryTourStore {
    tours: Arc<Mutex<HashMap<Uuid, Tour>>>,
}

impl InMemoryTourStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, tour: Tour) {
        self.tours.lock().unwrap().insert(tour.id, tour);
    }
}

#[async_trait]
impl TourStore for InMemoryTourStore {
    async fn get(&self, id: Uuid) -> Result<Option<Tour>, AppError> {
        Ok(self.tours.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Tour>, AppError> {
        Ok(self.tours.lock().unwrap().values().cloned().collect())
    }
}

/// Recording storage backend; optionally fails uploads or deletes.
#[derive(Clone, Default)]
pub struct MockStorage {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub deletes: Arc<Mutex<Vec<String>>>,
    pub fail_uploads: Arc<Mutex<bool>>,
    pub fail_deletes: Arc<Mutex<bool>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        _content_type: &str,
        _data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        if *self.fail_uploads.lock().unwrap() {
            return Err(StorageError::UploadFailed("mock upload failure".to_string()));
        }
        let key = format!("{}/{}", folder, filename);
        self.uploads.lock().unwrap().push(key.clone());
        Ok(StoredObject {
            url: format!("https://storage.test/{}", key),
            key,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(StorageError::DeleteFailed("mock delete failure".to_string()));
        }
        self.deletes.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let uploaded = self
            .uploads
            .lock()
            .unwrap()
            .iter()
            .any(|k| k == storage_key);
        let deleted = self
            .deletes
            .lock()
            .unwrap()
            .iter()
            .any(|k| k == storage_key);
        Ok(uploaded && !deleted)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Recording notifier; optionally fails to exercise the fire-and-forget path.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notifications: Arc<Mutex<Vec<AdminNotification>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn sent(&self) -> Vec<AdminNotification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminNotifier for RecordingNotifier {
    async fn notify_admin(&self, notification: AdminNotification) -> Result<(), AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Internal("mock notifier failure".to_string()));
        }
        self.notifications.lock().unwrap().push(notification);
        Ok(())
    }
}
