//! Application state shared by all handlers.

use sqlx::PgPool;
use std::sync::Arc;

use wayfarer_core::Config;
use wayfarer_db::{DependantProfileStore, TourStore};
use wayfarer_services::{
    ApplicationService, BookingService, DependantRosterService, DocumentLifecycleService,
};

/// Main application state: configuration, the database pool, and the
/// lifecycle services handlers dispatch into.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub bookings: BookingService,
    pub applications: ApplicationService,
    pub documents: DocumentLifecycleService,
    pub roster: DependantRosterService,
    pub profiles: Arc<dyn DependantProfileStore>,
    pub tours: Arc<dyn TourStore>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
