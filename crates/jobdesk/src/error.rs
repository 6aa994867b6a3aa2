use std::path::PathBuf;
use thiserror::Error;

use crate::form::FormField;

#[derive(Error, Debug)]
pub enum JobdeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Config does not match schema: {errors}")]
    SchemaValidation { errors: String },
}

/// Errors raised by a [`crate::store::DocumentStore`] backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Document encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document '{collection}/{key}' already exists")]
    AlreadyExists { collection: String, key: String },

    /// A non-atomic batch stopped part way; `applied` operations are durable.
    #[error("Batch failed after {applied} applied operation(s): {source}")]
    PartialCommit {
        applied: usize,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Store backend failure: {0}")]
    Backend(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Engineer slot {index} is out of range (have {len})")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("The primary engineer slot cannot be removed")]
    PrimarySlot,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{} is required.", .0.label())]
    MissingField(FormField),

    #[error("{} has an invalid value '{value}'.", .field.label())]
    InvalidValue { field: FormField, value: String },

    #[error("A job with ID '{0}' already exists.")]
    DuplicateJob(String),

    #[error("Failed to create job: {0}")]
    Store(#[source] StoreError),

    /// The job document was written but the customer upsert failed.
    #[error("Job '{job_id}' was saved but the customer record failed: {source}")]
    CustomerNotRecorded {
        job_id: String,
        #[source]
        source: StoreError,
    },
}

impl SubmitError {
    /// True when the error was raised before any write was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SubmitError::MissingField(_) | SubmitError::InvalidValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, JobdeskError>;
