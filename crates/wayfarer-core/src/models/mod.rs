//! Domain models shared across Wayfarer components.

pub mod application;
pub mod booking;
pub mod dependant;
pub mod dependant_profile;
pub mod document;
pub mod tour;
pub mod user;

pub use application::{
    format_application_number, new_application_number, ApplicationForm, ApplicationFormPatch,
    ApplicationStatus, ReviewDecision, SubmitOutcome, VisaApplication,
};
pub use booking::{Booking, BookingResponse, BookingStatus, NewBooking, PaymentStatus};
pub use dependant::{Dependant, DependantDraft, DependantResponse, NewDependant};
pub use dependant_profile::{DependantProfile, DependantProfileResponse, NewDependantProfile};
pub use document::{
    DocumentLocation, DocumentResponse, DocumentSet, DocumentType, TravelDocument,
};
pub use tour::{Tour, TourResponse};
pub use user::{Caller, Role, User};
