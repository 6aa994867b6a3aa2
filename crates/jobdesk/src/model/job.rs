//! Job record as persisted in the `jobs` collection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where the service is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceLocation {
    #[serde(rename = "Sandeep Enterprises")]
    SandeepEnterprises,
    #[serde(rename = "Customer Location")]
    CustomerLocation,
}

impl ServiceLocation {
    pub const ALL: [ServiceLocation; 2] = [
        ServiceLocation::SandeepEnterprises,
        ServiceLocation::CustomerLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLocation::SandeepEnterprises => "Sandeep Enterprises",
            ServiceLocation::CustomerLocation => "Customer Location",
        }
    }
}

impl fmt::Display for ServiceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|loc| loc.as_str() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// Warranty / request classification of a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    #[serde(rename = "Inside Warranty")]
    InsideWarranty,
    #[serde(rename = "Outside Warranty")]
    OutsideWarranty,
    #[serde(rename = "Commissioning/Installation Request")]
    CommissioningRequest,
}

impl CallStatus {
    pub const ALL: [CallStatus; 3] = [
        CallStatus::InsideWarranty,
        CallStatus::OutsideWarranty,
        CallStatus::CommissioningRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::InsideWarranty => "Inside Warranty",
            CallStatus::OutsideWarranty => "Outside Warranty",
            CallStatus::CommissioningRequest => "Commissioning/Installation Request",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// Lifecycle status. Intake only ever creates jobs in the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "Not Inspected")]
    NotInspected,
}

/// A service job. The job ID doubles as the document key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub jobid: String,
    /// Service date.
    pub jdate: NaiveDate,
    pub loc: ServiceLocation,
    pub customer_name: String,
    pub phone: String,
    pub city: String,
    /// Point of contact at the customer.
    pub poc: String,
    pub brand: String,
    pub model: String,
    /// Empty when not given.
    #[serde(default)]
    pub serial_no: String,
    /// Complaint description, empty when not given.
    #[serde(default)]
    pub description: String,
    pub call_status: Option<CallStatus>,
    /// Assigned engineer emails, at most three, none empty.
    #[serde(default)]
    pub engineers: Vec<String>,
    pub status: JobStatus,
    /// Assigned by the store on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
