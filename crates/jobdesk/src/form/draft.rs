//! In-progress job record and its edit operations.

use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

/// Upper bound on simultaneously assigned engineers.
pub const MAX_ENGINEERS: usize = 3;

/// Scalar fields of the job form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    JobId,
    Date,
    Location,
    CustomerName,
    Phone,
    City,
    Poc,
    Brand,
    Model,
    SerialNo,
    Description,
    CallStatus,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::JobId,
        FormField::Date,
        FormField::Location,
        FormField::CustomerName,
        FormField::Phone,
        FormField::City,
        FormField::Poc,
        FormField::Brand,
        FormField::Model,
        FormField::SerialNo,
        FormField::Description,
        FormField::CallStatus,
    ];

    /// Fields that must be non-blank, in the order they are checked.
    pub const REQUIRED: [FormField; 9] = [
        FormField::JobId,
        FormField::Date,
        FormField::Location,
        FormField::CustomerName,
        FormField::Phone,
        FormField::City,
        FormField::Poc,
        FormField::Brand,
        FormField::Model,
    ];

    /// Document field name.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::JobId => "jobid",
            FormField::Date => "jdate",
            FormField::Location => "loc",
            FormField::CustomerName => "customerName",
            FormField::Phone => "phone",
            FormField::City => "city",
            FormField::Poc => "poc",
            FormField::Brand => "brand",
            FormField::Model => "model",
            FormField::SerialNo => "serialNo",
            FormField::Description => "description",
            FormField::CallStatus => "callStatus",
        }
    }

    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            FormField::JobId => "Job ID",
            FormField::Date => "Date",
            FormField::Location => "Location of Service",
            FormField::CustomerName => "Customer Name",
            FormField::Phone => "Phone",
            FormField::City => "City",
            FormField::Poc => "POC",
            FormField::Brand => "Brand",
            FormField::Model => "Model",
            FormField::SerialNo => "Serial No.",
            FormField::Description => "Complaint Description",
            FormField::CallStatus => "Call Status",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FormField {
    type Err = String;

    /// Parses a document field name such as `customerName`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown form field '{}'", s))
    }
}

/// The job form's working copy. Values are kept exactly as typed;
/// validation happens on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    jobid: String,
    jdate: String,
    loc: String,
    customer_name: String,
    phone: String,
    city: String,
    poc: String,
    brand: String,
    model: String,
    serial_no: String,
    description: String,
    call_status: String,
    /// Always 1..=MAX_ENGINEERS slots; slots may be empty.
    engineers: Vec<String>,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            jobid: String::new(),
            jdate: String::new(),
            loc: String::new(),
            customer_name: String::new(),
            phone: String::new(),
            city: String::new(),
            poc: String::new(),
            brand: String::new(),
            model: String::new(),
            serial_no: String::new(),
            description: String::new(),
            call_status: String::new(),
            engineers: vec![String::new()],
        }
    }
}

impl JobDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::JobId => &self.jobid,
            FormField::Date => &self.jdate,
            FormField::Location => &self.loc,
            FormField::CustomerName => &self.customer_name,
            FormField::Phone => &self.phone,
            FormField::City => &self.city,
            FormField::Poc => &self.poc,
            FormField::Brand => &self.brand,
            FormField::Model => &self.model,
            FormField::SerialNo => &self.serial_no,
            FormField::Description => &self.description,
            FormField::CallStatus => &self.call_status,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::JobId => &mut self.jobid,
            FormField::Date => &mut self.jdate,
            FormField::Location => &mut self.loc,
            FormField::CustomerName => &mut self.customer_name,
            FormField::Phone => &mut self.phone,
            FormField::City => &mut self.city,
            FormField::Poc => &mut self.poc,
            FormField::Brand => &mut self.brand,
            FormField::Model => &mut self.model,
            FormField::SerialNo => &mut self.serial_no,
            FormField::Description => &mut self.description,
            FormField::CallStatus => &mut self.call_status,
        }
    }

    /// Replaces one scalar field.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// Builder-style [`Self::set_field`].
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set_field(field, value);
        self
    }

    /// Engineer slots in order, including empty ones.
    pub fn engineers(&self) -> &[String] {
        &self.engineers
    }

    /// Non-empty engineer slots, in slot order.
    pub fn assigned_engineers(&self) -> Vec<String> {
        self.engineers
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn set_engineer_at(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let len = self.engineers.len();
        let slot = self
            .engineers
            .get_mut(index)
            .ok_or(FormError::SlotOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    /// Appends an empty slot. Returns false (and does nothing) when all
    /// slots are already in use.
    pub fn add_engineer_slot(&mut self) -> bool {
        if !self.can_add_engineer() {
            return false;
        }
        self.engineers.push(String::new());
        true
    }

    /// Removes a slot and returns its value. Slot 0 is permanent.
    pub fn remove_engineer_slot(&mut self, index: usize) -> Result<String, FormError> {
        if index == 0 {
            return Err(FormError::PrimarySlot);
        }
        if index >= self.engineers.len() {
            return Err(FormError::SlotOutOfRange {
                index,
                len: self.engineers.len(),
            });
        }
        Ok(self.engineers.remove(index))
    }

    pub fn can_add_engineer(&self) -> bool {
        self.engineers.len() < MAX_ENGINEERS
    }

    /// Back to the empty shape.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}
