//! Persisted records and read-only projections.

pub mod job;

pub use job::{CallStatus, Job, JobStatus, ServiceLocation};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Role value marking a user as an assignable engineer.
pub const ENGINEER_ROLE: &str = "engineer";

/// Customer record, keyed by name in the `customers` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }
}

/// An engineer that can be assigned to a job, projected from `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineerOption {
    /// Display name.
    pub name: String,
    /// Stored in the job's `engineers` list.
    pub email: String,
}

impl EngineerOption {
    /// Projects a user document. Users without an email cannot be assigned;
    /// a missing name falls back to the email.
    pub fn from_user(doc: &Document) -> Option<Self> {
        let email = doc.get_str("email").map(str::trim).filter(|e| !e.is_empty())?;
        let name = doc
            .get_str("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(email);
        Some(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}
