//! Reusable per-user dependant templates. A profile is a copy-source only:
//! creating a dependant from one copies its fields at that moment and keeps
//! no reference back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DependantProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a profile template.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDependantProfile {
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
}

/// Profile as returned to API clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct DependantProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DependantProfile> for DependantProfileResponse {
    fn from(profile: DependantProfile) -> Self {
        DependantProfileResponse {
            id: profile.id,
            name: profile.name,
            relationship: profile.relationship,
            date_of_birth: profile.date_of_birth,
            passport_number: profile.passport_number,
            nationality: profile.nationality,
            gender: profile.gender,
            created_at: profile.created_at,
        }
    }
}
