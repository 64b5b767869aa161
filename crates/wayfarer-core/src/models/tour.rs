//! Tour package. Bookings reference a tour, and the admin notification on a
//! first application submission includes the tour title. Tour management
//! itself (pricing tiers, itineraries, media) is outside this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub duration_days: i32,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TourResponse {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub duration_days: i32,
    pub price_cents: i64,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        TourResponse {
            id: tour.id,
            title: tour.title,
            destination: tour.destination,
            duration_days: tour.duration_days,
            price_cents: tour.price_cents,
        }
    }
}
