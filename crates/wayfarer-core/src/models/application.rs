//! Visa application sub-record: form data, submission state, and review state.
//!
//! The same sub-record is embedded in a booking (main applicant) and in each
//! dependant. Status transitions live here so both carriers share one state
//! machine; the booking-level process-closed gate is enforced by callers,
//! which know the owning booking and the caller's role.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::validate_passport_expiry;

/// Lifecycle status of a visa application.
///
/// `Accepted` and `Rejected` are terminal: no Submit or Patch is permitted
/// once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Submitted => write!(f, "submitted"),
            ApplicationStatus::UnderReview => write!(f, "under_review"),
            ApplicationStatus::Accepted => write!(f, "accepted"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "submitted" => Ok(ApplicationStatus::Submitted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(AppError::Internal(format!(
                "Unknown application status: {}",
                other
            ))),
        }
    }
}

/// Reviewer decision applied to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    UnderReview,
    Accepted,
    Rejected,
}

/// The recognized visa-application form field set.
///
/// Submit replaces the whole set; Patch updates only the fields present in
/// the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationForm {
    pub nationality: Option<String>,
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub passport_number: Option<String>,
    pub passport_issue_date: Option<NaiveDate>,
    pub passport_expiry_date: Option<NaiveDate>,
    pub passport_place_of_issue: Option<String>,
    pub residential_address: Option<String>,
    pub city: Option<String>,
    pub country_of_residence: Option<String>,
    pub postal_code: Option<String>,
    pub occupation: Option<String>,
}

/// Partial update of [`ApplicationForm`]: only fields present in the request
/// are applied; everything else is left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ApplicationFormPatch {
    pub nationality: Option<String>,
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub passport_number: Option<String>,
    pub passport_issue_date: Option<NaiveDate>,
    pub passport_expiry_date: Option<NaiveDate>,
    pub passport_place_of_issue: Option<String>,
    pub residential_address: Option<String>,
    pub city: Option<String>,
    pub country_of_residence: Option<String>,
    pub postal_code: Option<String>,
    pub occupation: Option<String>,
}

macro_rules! apply_patch_fields {
    ($patch:expr, $form:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field.clone() {
                $form.$field = Some(value);
            }
        )+
    };
}

impl ApplicationFormPatch {
    pub fn apply_to(&self, form: &mut ApplicationForm) {
        apply_patch_fields!(
            self,
            form,
            nationality,
            surname,
            first_name,
            middle_name,
            gender,
            marital_status,
            date_of_birth,
            place_of_birth,
            passport_number,
            passport_issue_date,
            passport_expiry_date,
            passport_place_of_issue,
            residential_address,
            city,
            country_of_residence,
            postal_code,
            occupation,
        );
    }
}

/// Outcome of a successful Submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First submission: submission flag, timestamp, status, and application
    /// number were all stamped.
    FirstSubmission,
    /// Form data replaced; status and submission timestamp left unchanged.
    Resubmission,
}

/// The visa-application sub-record embedded in a booking or dependant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisaApplication {
    pub form: ApplicationForm,
    pub form_submitted: bool,
    pub form_submitted_at: Option<DateTime<Utc>>,
    pub status: Option<ApplicationStatus>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub application_number: Option<String>,
}

impl VisaApplication {
    /// Effective status; a record that has never been touched is `pending`.
    pub fn status(&self) -> ApplicationStatus {
        self.status.unwrap_or(ApplicationStatus::Pending)
    }

    fn ensure_not_reviewed(&self) -> Result<(), AppError> {
        if self.status().is_terminal() {
            return Err(AppError::already_reviewed());
        }
        Ok(())
    }

    /// Submit the application form.
    ///
    /// Replaces the stored field set with `form`. On the first submission the
    /// submission flag, timestamp, and status are stamped and an application
    /// number is generated via `number_gen`; a resubmission only replaces the
    /// form data. The passport six-month rule applies to every submission,
    /// and no state changes when it fails.
    pub fn submit<F>(
        &mut self,
        form: ApplicationForm,
        now: DateTime<Utc>,
        number_gen: F,
    ) -> Result<SubmitOutcome, AppError>
    where
        F: FnOnce() -> String,
    {
        self.ensure_not_reviewed()?;
        if let Some(expiry) = form.passport_expiry_date {
            validate_passport_expiry(expiry, now)?;
        }

        self.form = form;

        if self.form_submitted {
            return Ok(SubmitOutcome::Resubmission);
        }

        self.form_submitted = true;
        self.form_submitted_at = Some(now);
        self.status = Some(ApplicationStatus::Submitted);
        if self.application_number.is_none() {
            self.application_number = Some(number_gen());
        }
        Ok(SubmitOutcome::FirstSubmission)
    }

    /// Apply a partial field update. Gated by the terminal lock but never
    /// changes status or submission flags.
    pub fn patch(&mut self, patch: &ApplicationFormPatch) -> Result<(), AppError> {
        self.ensure_not_reviewed()?;
        patch.apply_to(&mut self.form);
        Ok(())
    }

    /// Apply a reviewer decision. Accepted/rejected stamp the review metadata
    /// and are terminal; under_review only moves the status.
    pub fn review(&mut self, decision: ReviewDecision, reviewer: Uuid, now: DateTime<Utc>) {
        match decision {
            ReviewDecision::UnderReview => {
                self.status = Some(ApplicationStatus::UnderReview);
            }
            ReviewDecision::Accepted => {
                self.status = Some(ApplicationStatus::Accepted);
                self.reviewed_at = Some(now);
                self.reviewed_by = Some(reviewer);
            }
            ReviewDecision::Rejected => {
                self.status = Some(ApplicationStatus::Rejected);
                self.reviewed_at = Some(now);
                self.reviewed_by = Some(reviewer);
            }
        }
    }
}

/// Build an application number from a date and a 6-digit suffix: `YYMMDDRRRRRR`.
pub fn format_application_number(date: NaiveDate, suffix: u32) -> String {
    format!("{}{:06}", date.format("%y%m%d"), suffix % 1_000_000)
}

/// Generate a fresh application number for the given submission time.
/// Uniqueness is probabilistic via the random suffix; records are keyed by
/// UUID, so a collision only affects the display number.
pub fn new_application_number(now: DateTime<Utc>) -> String {
    use rand::Rng;
    let suffix = rand::rng().random_range(0..1_000_000u32);
    format_application_number(now.date_naive(), suffix)
}
