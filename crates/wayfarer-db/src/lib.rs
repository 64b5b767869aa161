//! Wayfarer database layer
//!
//! Postgres repositories for bookings, dependants, dependant profiles,
//! tours, and users, plus the store traits services depend on so they can
//! be exercised against in-memory fakes.

pub mod db;
pub mod stores;

pub use db::{
    BookingRepository, DependantProfileRepository, DependantRepository, TourRepository,
    UserRepository,
};
pub use db::transaction::TransactionGuard;
pub use stores::{BookingStore, DependantProfileStore, DependantStore, TourStore, UserDirectory};
