//! Wayfarer lifecycle services
//!
//! Domain orchestration over the store traits: access policy, booking
//! checkout and payment, the application state machine, document slot
//! management, the dependant roster, and the admin notifier.

pub mod access;
pub mod application;
pub mod bookings;
pub mod dependants;
pub mod documents;
pub mod notify;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(test)]
mod scenario_tests;

pub use access::AccessPolicy;
pub use application::{ApplicationService, ProcessGateAction};
pub use bookings::{BookingService, PaymentOutcome};
pub use dependants::DependantRosterService;
pub use documents::{DocumentLifecycleService, DocumentUpload};
pub use notify::{AdminNotification, AdminNotifier, ApplicantKind, EmailNotifier, NoopNotifier};
