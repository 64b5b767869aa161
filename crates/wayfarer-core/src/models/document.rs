//! Travel documents attached to an applicant.
//!
//! A document is a value object embedded in its parent booking or dependant,
//! never a standalone row. Each applicant has two fixed single-document slots
//! (personal passport picture, international passport) and an open-ended,
//! order-preserving list of named supporting documents. A legacy unified
//! `documents` list additionally receives every upload; it exists for
//! backward compatibility with older clients and is never the source of
//! truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Which slot (or list) a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    PersonalPassportPicture,
    InternationalPassport,
    SupportingDocument,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::PersonalPassportPicture => write!(f, "personal_passport_picture"),
            DocumentType::InternationalPassport => write!(f, "international_passport"),
            DocumentType::SupportingDocument => write!(f, "supporting_document"),
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal_passport_picture" => Ok(DocumentType::PersonalPassportPicture),
            "international_passport" => Ok(DocumentType::InternationalPassport),
            "supporting_document" => Ok(DocumentType::SupportingDocument),
            other => Err(AppError::Validation(format!(
                "Unknown document type: {}",
                other
            ))),
        }
    }
}

/// An uploaded travel document, embedded in its parent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDocument {
    pub id: Uuid,
    /// Display name (the supporting-document name, or a slot-derived label).
    pub name: String,
    /// Public content URL in the object store.
    pub url: String,
    /// Storage-provider identifier used for deletion.
    pub storage_key: String,
    pub document_type: DocumentType,
    pub uploaded_at: DateTime<Utc>,
}

impl TravelDocument {
    /// Whether `reference` identifies this document: its id or storage key.
    pub fn matches(&self, reference: &str) -> bool {
        self.storage_key == reference
            || Uuid::parse_str(reference).is_ok_and(|id| id == self.id)
    }
}

/// Where a detached document was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLocation {
    PersonalPassportPictureSlot,
    InternationalPassportSlot,
    SupportingDocuments,
    LegacyList,
}

/// The full document attachment state of one applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub personal_passport_picture: Option<TravelDocument>,
    pub international_passport: Option<TravelDocument>,
    pub supporting_documents: Vec<TravelDocument>,
    /// Legacy unified list; append-only mirror of every upload.
    pub documents: Vec<TravelDocument>,
}

impl DocumentSet {
    /// Attach a document to its slot or to the supporting-documents list.
    ///
    /// Fixed slots replace their current occupant and return it so the caller
    /// can delete the old object from the store; the supporting list appends
    /// in insertion order without dedup. Every attached document is also
    /// appended to the legacy unified list.
    pub fn attach(&mut self, document: TravelDocument) -> Option<TravelDocument> {
        let replaced = match document.document_type {
            DocumentType::PersonalPassportPicture => {
                self.personal_passport_picture.replace(document.clone())
            }
            DocumentType::InternationalPassport => {
                self.international_passport.replace(document.clone())
            }
            DocumentType::SupportingDocument => {
                self.supporting_documents.push(document.clone());
                None
            }
        };
        self.documents.push(document);
        replaced
    }

    /// Remove the first document matching `reference` (id or storage key),
    /// searching the fixed slots, then the supporting list, then the legacy
    /// list. Returns the removed document and where it was found.
    pub fn detach(
        &mut self,
        reference: &str,
    ) -> Result<(TravelDocument, DocumentLocation), AppError> {
        if let Some(doc) = self
            .personal_passport_picture
            .take_if(|d| d.matches(reference))
        {
            return Ok((doc, DocumentLocation::PersonalPassportPictureSlot));
        }
        if let Some(doc) = self.international_passport.take_if(|d| d.matches(reference)) {
            return Ok((doc, DocumentLocation::InternationalPassportSlot));
        }
        if let Some(pos) = self
            .supporting_documents
            .iter()
            .position(|d| d.matches(reference))
        {
            return Ok((
                self.supporting_documents.remove(pos),
                DocumentLocation::SupportingDocuments,
            ));
        }
        if let Some(pos) = self.documents.iter().position(|d| d.matches(reference)) {
            return Ok((self.documents.remove(pos), DocumentLocation::LegacyList));
        }
        Err(AppError::NotFound("Document not found".to_string()))
    }

    /// Storage keys of every distinct object referenced by this set, for
    /// cleanup when the parent record is deleted.
    pub fn storage_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .personal_passport_picture
            .iter()
            .chain(self.international_passport.iter())
            .chain(self.supporting_documents.iter())
            .chain(self.documents.iter())
            .map(|d| d.storage_key.clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Document descriptor returned to API clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub document_type: DocumentType,
    pub uploaded_at: DateTime<Utc>,
}

impl From<TravelDocument> for DocumentResponse {
    fn from(doc: TravelDocument) -> Self {
        DocumentResponse {
            id: doc.id,
            name: doc.name,
            url: doc.url,
            document_type: doc.document_type,
            uploaded_at: doc.uploaded_at,
        }
    }
}
