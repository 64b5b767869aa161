//! OpenAPI document for the Wayfarer API.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use wayfarer_core::models::{
    ApplicationForm, ApplicationFormPatch, ApplicationStatus, BookingResponse, BookingStatus,
    DependantProfileResponse, DependantResponse, DocumentResponse, DocumentType,
    NewDependantProfile, PaymentStatus, TourResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::bookings::create_booking,
        handlers::bookings::list_bookings,
        handlers::bookings::get_booking,
        handlers::bookings::record_payment,
        handlers::applications::submit_main_application,
        handlers::applications::patch_main_application,
        handlers::applications::review_main_application,
        handlers::applications::set_process_gate,
        handlers::applications::submit_dependant_application,
        handlers::applications::patch_dependant_application,
        handlers::applications::review_dependant_application,
        handlers::documents::attach_booking_document,
        handlers::documents::detach_booking_document,
        handlers::documents::attach_dependant_document,
        handlers::documents::detach_dependant_document,
        handlers::dependants::add_dependant,
        handlers::dependants::list_dependants,
        handlers::dependants::remove_dependant,
        handlers::profiles::create_profile,
        handlers::profiles::list_profiles,
        handlers::profiles::delete_profile,
        handlers::tours::list_tours,
        handlers::tours::get_tour,
    ),
    components(schemas(
        ErrorResponse,
        ApplicationForm,
        ApplicationFormPatch,
        ApplicationStatus,
        BookingResponse,
        BookingStatus,
        PaymentStatus,
        DependantResponse,
        DependantProfileResponse,
        NewDependantProfile,
        DocumentResponse,
        DocumentType,
        TourResponse,
        handlers::bookings::CheckoutRequest,
        handlers::bookings::PaymentRequest,
        handlers::applications::ReviewRequest,
        handlers::applications::ProcessGateRequest,
        handlers::dependants::AddDependantRequest,
    )),
    tags(
        (name = "bookings", description = "Booking checkout, retrieval, payment"),
        (name = "applications", description = "Visa application lifecycle"),
        (name = "documents", description = "Travel document attachments"),
        (name = "dependants", description = "Dependant roster management"),
        (name = "profiles", description = "Reusable dependant templates"),
        (name = "tours", description = "Tour packages"),
    ),
    info(
        title = "Wayfarer API",
        description = "Travel-agency booking and visa-application lifecycle service"
    )
)]
pub struct ApiDoc;
