//! Builders for test drafts and seed documents.

#![allow(dead_code)]

use serde_json::{json, Value};

use jobdesk::form::{FormField, JobDraft};
use jobdesk::store::Fields;

/// Builds a `JobDraft` that passes validation unless told otherwise.
pub struct DraftBuilder {
    draft: JobDraft,
    engineers: Vec<String>,
}

impl DraftBuilder {
    pub fn new() -> Self {
        let draft = JobDraft::new()
            .with(FormField::JobId, "J100")
            .with(FormField::Date, "2026-10-17")
            .with(FormField::Location, "Customer Location")
            .with(FormField::CustomerName, "NewCo")
            .with(FormField::Phone, "555-0100")
            .with(FormField::City, "Pune")
            .with(FormField::Poc, "R. Shah")
            .with(FormField::Brand, "Haas")
            .with(FormField::Model, "VF-2");
        Self {
            draft,
            engineers: Vec::new(),
        }
    }

    pub fn field(mut self, field: FormField, value: &str) -> Self {
        self.draft.set_field(field, value);
        self
    }

    pub fn job_id(self, id: &str) -> Self {
        self.field(FormField::JobId, id)
    }

    pub fn customer(self, name: &str) -> Self {
        self.field(FormField::CustomerName, name)
    }

    /// Fills engineer slots in order, adding slots as needed.
    pub fn engineers(mut self, emails: &[&str]) -> Self {
        self.engineers = emails.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn build(self) -> JobDraft {
        let mut draft = self.draft;
        for (index, email) in self.engineers.into_iter().enumerate() {
            if index >= draft.engineers().len() {
                assert!(draft.add_engineer_slot(), "too many engineers for a draft");
            }
            draft
                .set_engineer_at(index, email)
                .expect("slot exists after add");
        }
        draft
    }
}

impl Default for DraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a JSON object literal into document fields.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn user(name: &str, email: &str, role: &str, registered: bool) -> Fields {
    fields(json!({
        "name": name,
        "email": email,
        "role": role,
        "isRegistered": registered,
    }))
}
