//! Store traits implemented by the Postgres repositories.
//!
//! Services depend on these rather than on concrete repositories so the
//! lifecycle logic can be tested against in-memory implementations.

use async_trait::async_trait;
use uuid::Uuid;
use wayfarer_core::models::{
    Booking, BookingStatus, Dependant, DependantProfile, NewBooking, NewDependant,
    NewDependantProfile, PaymentStatus, Tour, User, VisaApplication,
};
use wayfarer_core::models::DocumentSet;
use wayfarer_core::AppError;

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, new: NewBooking) -> Result<Booking, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Bookings owned by the user, by id or by customer email.
    async fn list_for_user(&self, user_id: Uuid, email: &str) -> Result<Vec<Booking>, AppError>;

    async fn list_all(&self) -> Result<Vec<Booking>, AppError>;

    async fn set_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        booking_status: BookingStatus,
    ) -> Result<Booking, AppError>;

    /// Persist the main applicant's application sub-record.
    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError>;

    /// Persist the main applicant's document set.
    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError>;

    /// Persist the application-process gate (closed flag and its stamps).
    async fn update_process_gate(&self, booking: &Booking) -> Result<(), AppError>;
}

#[async_trait]
pub trait DependantStore: Send + Sync {
    /// Insert a dependant while enforcing the traveler-capacity invariant.
    ///
    /// The count check and the insert must be atomic with respect to
    /// concurrent adds against the same booking.
    async fn create_in_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        new: &NewDependant,
    ) -> Result<Dependant, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Dependant>, AppError>;

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Dependant>, AppError>;

    async fn count_for_booking(&self, booking_id: Uuid) -> Result<i64, AppError>;

    async fn update_application(
        &self,
        id: Uuid,
        application: &VisaApplication,
    ) -> Result<(), AppError>;

    async fn update_documents(&self, id: Uuid, documents: &DocumentSet) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait DependantProfileStore: Send + Sync {
    async fn create(&self, user_id: Uuid, new: NewDependantProfile)
        -> Result<DependantProfile, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<DependantProfile>, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DependantProfile>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// User lookup collaborator; used by the access check when the caller's
/// token lacks an email claim.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TourStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Tour>, AppError>;

    async fn list(&self) -> Result<Vec<Tour>, AppError>;
}
