//! Work submission drafts and payload assembly.
//!
//! Transport is the host's job. This module only decides whether a draft is
//! complete and lays out the form fields, including the recorded time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Your work has been submitted successfully!";
/// Used when the server rejects a submission without saying why.
pub const SUBMIT_REJECTED_MESSAGE: &str = "Something went wrong";
/// Used when the request never got an answer.
pub const SUBMIT_TRANSPORT_MESSAGE: &str = "Failed to submit form. Please try again.";

/// User input for the work form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDraft {
    pub title: String,
    pub body: String,
    /// Required.
    pub photo1: Option<PathBuf>,
    pub photo2: Option<PathBuf>,
    pub photo3: Option<PathBuf>,
}

impl WorkDraft {
    /// Blank title and body count as missing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.body.trim().is_empty() {
            missing.push("body");
        }
        if self.photo1.is_none() {
            missing.push("photo1");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::IncompleteDraft { missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

impl FormField {
    fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Text(value.into()),
        }
    }

    fn file(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::File(path),
        }
    }
}

/// A validated draft stamped with the recorded time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSubmission {
    pub draft: WorkDraft,
    pub recorded_secs: u64,
}

impl WorkSubmission {
    pub fn new(draft: WorkDraft, recorded_secs: u64) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            draft,
            recorded_secs,
        })
    }

    /// Fields in wire order: `title`, `body`, `photo1`, `recorded_time`,
    /// then the optional photos.
    pub fn form_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("title", self.draft.title.clone()),
            FormField::text("body", self.draft.body.clone()),
        ];
        if let Some(photo) = &self.draft.photo1 {
            fields.push(FormField::file("photo1", photo.clone()));
        }
        fields.push(FormField::text("recorded_time", self.recorded_secs.to_string()));
        if let Some(photo) = &self.draft.photo2 {
            fields.push(FormField::file("photo2", photo.clone()));
        }
        if let Some(photo) = &self.draft.photo3 {
            fields.push(FormField::file("photo3", photo.clone()));
        }
        fields
    }
}
