use sqlx::PgPool;
use std::sync::Arc;

use wayfarer_core::Config;
use wayfarer_db::{
    BookingRepository, DependantProfileRepository, DependantRepository, TourRepository,
    UserRepository,
};
use wayfarer_services::{
    AccessPolicy, AdminNotifier, ApplicationService, BookingService, DependantRosterService,
    DocumentLifecycleService, EmailNotifier, NoopNotifier,
};
use wayfarer_storage::create_storage;

use crate::state::AppState;

/// Wire repositories, storage, the notifier, and the lifecycle services.
pub async fn setup_services(config: Config, pool: PgPool) -> Result<Arc<AppState>, anyhow::Error> {
    let bookings = Arc::new(BookingRepository::new(pool.clone()));
    let dependants = Arc::new(DependantRepository::new(pool.clone()));
    let profiles = Arc::new(DependantProfileRepository::new(pool.clone()));
    let tours = Arc::new(TourRepository::new(pool.clone()));
    let users = Arc::new(UserRepository::new(pool.clone()));

    let storage = create_storage(&config).await?;
    tracing::info!(backend = %storage.backend_type(), "Object storage initialized");

    let notifier: Arc<dyn AdminNotifier> = match EmailNotifier::from_config(&config) {
        Some(notifier) => Arc::new(notifier),
        None => Arc::new(NoopNotifier),
    };

    let access = AccessPolicy::new(users);

    let booking_service =
        BookingService::new(bookings.clone(), tours.clone(), access.clone());
    let application_service = ApplicationService::new(
        bookings.clone(),
        dependants.clone(),
        tours.clone(),
        access.clone(),
        notifier,
    );
    let document_service = DocumentLifecycleService::new(
        bookings.clone(),
        dependants.clone(),
        access.clone(),
        storage.clone(),
    );
    let roster_service = DependantRosterService::new(
        bookings,
        dependants,
        profiles.clone(),
        access,
        storage,
    );

    Ok(Arc::new(AppState {
        config,
        pool,
        bookings: booking_service,
        applications: application_service,
        documents: document_service,
        roster: roster_service,
        profiles,
        tours,
    }))
}
