//! Domain validation rules.

mod passport;

pub use passport::{validate_passport_expiry, PASSPORT_MIN_VALIDITY_MONTHS};
