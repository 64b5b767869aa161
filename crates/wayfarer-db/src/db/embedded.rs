//! JSONB conversion helpers for the application and document sub-records
//! embedded in booking and dependant rows.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use wayfarer_core::models::{
    ApplicationForm, ApplicationStatus, DocumentSet, TravelDocument, VisaApplication,
};
use wayfarer_core::AppError;

/// Columns every applicant-carrying row shares for its application sub-record.
pub(crate) struct ApplicationColumns {
    pub application_form: JsonValue,
    pub application_form_submitted: bool,
    pub application_form_submitted_at: Option<DateTime<Utc>>,
    pub application_status: Option<String>,
    pub application_reviewed_at: Option<DateTime<Utc>>,
    pub application_reviewed_by: Option<Uuid>,
    pub application_number: Option<String>,
}

impl ApplicationColumns {
    pub fn into_application(self) -> Result<VisaApplication, AppError> {
        let form: ApplicationForm = serde_json::from_value(self.application_form)?;
        let status = self
            .application_status
            .as_deref()
            .map(str::parse::<ApplicationStatus>)
            .transpose()?;
        Ok(VisaApplication {
            form,
            form_submitted: self.application_form_submitted,
            form_submitted_at: self.application_form_submitted_at,
            status,
            reviewed_at: self.application_reviewed_at,
            reviewed_by: self.application_reviewed_by,
            application_number: self.application_number,
        })
    }
}

/// Columns every applicant-carrying row shares for its document set.
pub(crate) struct DocumentColumns {
    pub personal_passport_picture: Option<JsonValue>,
    pub international_passport: Option<JsonValue>,
    pub supporting_documents: JsonValue,
    pub documents: JsonValue,
}

impl DocumentColumns {
    pub fn into_document_set(self) -> Result<DocumentSet, AppError> {
        Ok(DocumentSet {
            personal_passport_picture: self
                .personal_passport_picture
                .map(serde_json::from_value::<TravelDocument>)
                .transpose()?,
            international_passport: self
                .international_passport
                .map(serde_json::from_value::<TravelDocument>)
                .transpose()?,
            supporting_documents: serde_json::from_value(self.supporting_documents)?,
            documents: serde_json::from_value(self.documents)?,
        })
    }
}

pub(crate) fn form_to_json(form: &ApplicationForm) -> Result<JsonValue, AppError> {
    serde_json::to_value(form).map_err(AppError::from)
}

pub(crate) fn document_to_json(doc: &TravelDocument) -> Result<JsonValue, AppError> {
    serde_json::to_value(doc).map_err(AppError::from)
}

pub(crate) fn documents_to_json(docs: &[TravelDocument]) -> Result<JsonValue, AppError> {
    serde_json::to_value(docs).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::models::DocumentType;

    #[test]
    fn application_columns_round_trip() {
        let cols = ApplicationColumns {
            application_form: serde_json::json!({
                "nationality": "Kenyan",
                "surname": "Wanjiru"
            }),
            application_form_submitted: true,
            application_form_submitted_at: Some(Utc::now()),
            application_status: Some("under_review".to_string()),
            application_reviewed_at: None,
            application_reviewed_by: None,
            application_number: Some("250314000009".to_string()),
        };
        let app = cols.into_application().unwrap();
        assert_eq!(app.form.nationality.as_deref(), Some("Kenyan"));
        assert_eq!(app.status(), ApplicationStatus::UnderReview);
        assert!(app.form_submitted);
    }

    #[test]
    fn empty_form_defaults() {
        let cols = ApplicationColumns {
            application_form: serde_json::json!({}),
            application_form_submitted: false,
            application_form_submitted_at: None,
            application_status: None,
            application_reviewed_at: None,
            application_reviewed_by: None,
            application_number: None,
        };
        let app = cols.into_application().unwrap();
        assert_eq!(app.status(), ApplicationStatus::Pending);
        assert_eq!(app.form, ApplicationForm::default());
    }

    #[test]
    fn document_columns_round_trip() {
        let doc = TravelDocument {
            id: Uuid::new_v4(),
            name: "passport.jpg".to_string(),
            url: "https://cdn.example.com/passport.jpg".to_string(),
            storage_key: "bookings/b1/passport.jpg".to_string(),
            document_type: DocumentType::InternationalPassport,
            uploaded_at: Utc::now(),
        };
        let cols = DocumentColumns {
            personal_passport_picture: None,
            international_passport: Some(document_to_json(&doc).unwrap()),
            supporting_documents: serde_json::json!([]),
            documents: documents_to_json(std::slice::from_ref(&doc)).unwrap(),
        };
        let set = cols.into_document_set().unwrap();
        assert_eq!(set.international_passport, Some(doc.clone()));
        assert_eq!(set.documents, vec![doc]);
    }
}
