//! Dependant: a secondary traveler attached to a booking, with their own
//! visa application and document set. A dependant belongs to exactly one
//! booking; reusable per-user templates live in
//! [`super::dependant_profile::DependantProfile`] and are copied, never
//! referenced, into a new dependant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::application::{ApplicationStatus, VisaApplication};
use super::dependant_profile::DependantProfile;
use super::document::DocumentSet;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependant {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub application: VisaApplication,
    pub documents: DocumentSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a dependant. All optional: values may come
/// from a profile template instead, with explicitly-supplied fields winning.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DependantDraft {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
}

/// A fully-resolved new dependant, after the draft/profile merge.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDependant {
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
}

impl DependantDraft {
    /// Merge this draft with an optional profile template. Draft fields win
    /// over profile fields; `name` and `relationship` must be present after
    /// the merge.
    pub fn resolve(self, profile: Option<&DependantProfile>) -> Result<NewDependant, AppError> {
        let name = self
            .name
            .or_else(|| profile.map(|p| p.name.clone()))
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Dependant name is required".to_string()))?;
        let relationship = self
            .relationship
            .or_else(|| profile.map(|p| p.relationship.clone()))
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation("Dependant relationship is required".to_string())
            })?;

        Ok(NewDependant {
            name,
            relationship,
            date_of_birth: self
                .date_of_birth
                .or_else(|| profile.and_then(|p| p.date_of_birth)),
            passport_number: self
                .passport_number
                .or_else(|| profile.and_then(|p| p.passport_number.clone())),
        })
    }
}

/// Dependant as returned to API clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct DependantResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub application_status: ApplicationStatus,
    pub application_number: Option<String>,
    pub application_form_submitted: bool,
    pub application_form_submitted_at: Option<DateTime<Utc>>,
}

impl From<Dependant> for DependantResponse {
    fn from(dep: Dependant) -> Self {
        DependantResponse {
            id: dep.id,
            booking_id: dep.booking_id,
            name: dep.name,
            relationship: dep.relationship,
            date_of_birth: dep.date_of_birth,
            passport_number: dep.passport_number,
            application_status: dep.application.status(),
            application_number: dep.application.application_number.clone(),
            application_form_submitted: dep.application.form_submitted,
            application_form_submitted_at: dep.application.form_submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DependantProfile {
        DependantProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            relationship: "Spouse".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1),
            passport_number: Some("B7654321".to_string()),
            nationality: Some("Ghanaian".to_string()),
            gender: Some("female".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn draft_fields_override_profile_fields() {
        let draft = DependantDraft {
            name: Some("Janet Doe".to_string()),
            passport_number: Some("C0000001".to_string()),
            ..Default::default()
        };
        let resolved = draft.resolve(Some(&profile())).unwrap();

        assert_eq!(resolved.name, "Janet Doe");
        assert_eq!(resolved.relationship, "Spouse");
        assert_eq!(resolved.passport_number.as_deref(), Some("C0000001"));
        assert_eq!(resolved.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
    }

    #[test]
    fn profile_alone_is_sufficient() {
        let resolved = DependantDraft::default().resolve(Some(&profile())).unwrap();
        assert_eq!(resolved.name, "Jane Doe");
        assert_eq!(resolved.relationship, "Spouse");
    }

    #[test]
    fn missing_name_or_relationship_fails_validation() {
        let err = DependantDraft {
            relationship: Some("Child".to_string()),
            ..Default::default()
        }
        .resolve(None)
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("name"));

        let err = DependantDraft {
            name: Some("Sam".to_string()),
            ..Default::default()
        }
        .resolve(None)
        .unwrap_err();
        assert!(err.to_string().contains("relationship"));

        // whitespace-only values do not count
        let err = DependantDraft {
            name: Some("  ".to_string()),
            relationship: Some("Child".to_string()),
            ..Default::default()
        }
        .resolve(None)
        .unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
