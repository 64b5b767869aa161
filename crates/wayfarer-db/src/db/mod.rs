//! Database repositories for the data access layer
//!
//! Each repository owns a single domain entity and provides CRUD operations
//! and specialized queries over its table. Embedded application and document
//! sub-records are stored as JSONB and converted via the `embedded` helpers
//! shared by the bookings and dependants repositories.

pub mod bookings;
pub mod dependant_profiles;
pub mod dependants;
pub(crate) mod embedded;
pub mod tours;
pub mod transaction;
pub mod users;

pub use bookings::BookingRepository;
pub use dependant_profiles::DependantProfileRepository;
pub use dependants::DependantRepository;
pub use tours::TourRepository;
pub use users::UserRepository;
