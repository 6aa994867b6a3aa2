//! Job submission: validate a draft, write the job, record the customer.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{info_span, Instrument};

use crate::config::{CollectionsConfig, Config, JobWritePolicy};
use crate::error::{StoreError, SubmitError};
use crate::form::{FormField, JobDraft};
use crate::model::{CallStatus, Customer, Job, JobStatus, ServiceLocation};
use crate::store::{DocumentStore, DocumentWrite, WriteBatch, WriteResult};

/// Field stamped with the store clock on every created document.
pub const CREATED_AT: &str = "createdAt";

/// Accepted format of the service date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What a successful submission persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReceipt {
    pub job_id: String,
    pub customer_name: String,
    /// False when the customer already existed.
    pub customer_created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(JobReceipt),
    /// Another submission was in flight; nothing was done.
    Skipped,
}

/// User-facing message for a submission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Created { job_id: String },
    MissingField(FormField),
    InvalidValue { field: FormField, value: String },
    DuplicateJob { job_id: String },
    /// The job was saved but its customer record was not.
    CustomerNotRecorded { job_id: String },
    Failed,
}

impl Notice {
    /// Maps a submission result to a notice. `None` for a skipped call.
    pub fn from_result(result: &Result<SubmitOutcome, SubmitError>) -> Option<Self> {
        match result {
            Ok(SubmitOutcome::Skipped) => None,
            Ok(SubmitOutcome::Created(receipt)) => Some(Notice::Created {
                job_id: receipt.job_id.clone(),
            }),
            Err(SubmitError::MissingField(field)) => Some(Notice::MissingField(*field)),
            Err(SubmitError::InvalidValue { field, value }) => Some(Notice::InvalidValue {
                field: *field,
                value: value.clone(),
            }),
            Err(SubmitError::DuplicateJob(job_id)) => Some(Notice::DuplicateJob {
                job_id: job_id.clone(),
            }),
            Err(SubmitError::CustomerNotRecorded { job_id, .. }) => {
                Some(Notice::CustomerNotRecorded {
                    job_id: job_id.clone(),
                })
            }
            Err(SubmitError::Store(_)) => Some(Notice::Failed),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Created { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Created { job_id } => write!(f, "Job created successfully! ID: {}", job_id),
            Notice::MissingField(field) => write!(f, "{} is required.", field.label()),
            Notice::InvalidValue { field, value } => {
                write!(f, "{} has an invalid value '{}'.", field.label(), value)
            }
            Notice::DuplicateJob { job_id } => {
                write!(f, "A job with ID '{}' already exists.", job_id)
            }
            Notice::CustomerNotRecorded { job_id } => write!(
                f,
                "Job {} was saved, but the customer record could not be created.",
                job_id
            ),
            Notice::Failed => f.write_str("Failed to create job. Please try again."),
        }
    }
}

/// Checks a draft and converts it into a job record.
///
/// Required fields are checked in form order and the first blank one is
/// reported. Text values are trimmed. Empty engineer slots are dropped.
pub fn build_job(draft: &JobDraft) -> Result<Job, SubmitError> {
    for field in FormField::REQUIRED {
        if draft.get(field).trim().is_empty() {
            return Err(SubmitError::MissingField(field));
        }
    }

    let text = |field: FormField| draft.get(field).trim().to_string();
    let invalid = |field: FormField| SubmitError::InvalidValue {
        field,
        value: draft.get(field).to_string(),
    };

    let jdate = NaiveDate::parse_from_str(draft.get(FormField::Date).trim(), DATE_FORMAT)
        .map_err(|_| invalid(FormField::Date))?;
    let loc: ServiceLocation = draft
        .get(FormField::Location)
        .parse()
        .map_err(|_| invalid(FormField::Location))?;
    let call_status = match draft.get(FormField::CallStatus).trim() {
        "" => None,
        raw => Some(
            raw.parse::<CallStatus>()
                .map_err(|_| invalid(FormField::CallStatus))?,
        ),
    };

    Ok(Job {
        jobid: text(FormField::JobId),
        jdate,
        loc,
        customer_name: text(FormField::CustomerName),
        phone: text(FormField::Phone),
        city: text(FormField::City),
        poc: text(FormField::Poc),
        brand: text(FormField::Brand),
        model: text(FormField::Model),
        serial_no: text(FormField::SerialNo),
        description: text(FormField::Description),
        call_status,
        engineers: draft.assigned_engineers(),
        status: JobStatus::NotInspected,
        created_at: None,
    })
}

/// Runs submissions against a document store, one at a time.
pub struct SubmissionCoordinator {
    store: Arc<dyn DocumentStore>,
    collections: CollectionsConfig,
    policy: JobWritePolicy,
    /// Held for the duration of a write sequence.
    in_flight: Mutex<()>,
}

impl SubmissionCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            store,
            collections: config.collections.clone(),
            policy: config.submission.job_write_policy,
            in_flight: Mutex::new(()),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Validates `draft` and persists it.
    ///
    /// Returns [`SubmitOutcome::Skipped`] without touching the store when
    /// another submission is in flight. The job is written before the
    /// customer, and the in-flight guard is released on every exit path.
    pub async fn submit(&self, draft: &JobDraft) -> Result<SubmitOutcome, SubmitError> {
        if self.is_submitting() {
            log::info!("Submit skipped: another submission is already in progress");
            return Ok(SubmitOutcome::Skipped);
        }

        let job = build_job(draft)?;

        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::info!("Submit skipped: another submission is already in progress");
                return Ok(SubmitOutcome::Skipped);
            }
        };

        let span = info_span!("submission.submit", job_id = %job.jobid);
        self.persist(job).instrument(span).await
    }

    async fn persist(&self, job: Job) -> Result<SubmitOutcome, SubmitError> {
        let job_id = job.jobid.clone();
        let customer_name = job.customer_name.clone();

        let job_write = DocumentWrite::from_record(&job)
            .map_err(SubmitError::Store)?
            .with_server_timestamp(CREATED_AT);
        let customer_write = DocumentWrite::from_record(&Customer::new(customer_name.as_str()))
            .map_err(SubmitError::Store)?
            .with_server_timestamp(CREATED_AT);

        let jobs = self.collections.jobs.as_str();
        let batch = match self.policy {
            JobWritePolicy::Overwrite => WriteBatch::new().set(jobs, &job_id, job_write),
            JobWritePolicy::RejectExisting => WriteBatch::new().create(jobs, &job_id, job_write),
        }
        .create_if_absent(&self.collections.customers, &customer_name, customer_write);

        match self.store.commit(batch).await {
            Ok(results) => {
                let customer_created = results.get(1) == Some(&WriteResult::Written);
                log::info!(
                    "Created job {} for customer '{}'{}",
                    job_id,
                    customer_name,
                    if customer_created { " (new customer)" } else { "" }
                );
                Ok(SubmitOutcome::Created(JobReceipt {
                    job_id,
                    customer_name,
                    customer_created,
                }))
            }
            Err(StoreError::AlreadyExists { collection, .. })
                if collection == self.collections.jobs =>
            {
                log::warn!("Rejected job {}: ID already exists", job_id);
                Err(SubmitError::DuplicateJob(job_id))
            }
            Err(StoreError::PartialCommit { applied, source }) if applied > 0 => {
                log::error!(
                    "Job {} was written but customer '{}' was not: {}",
                    job_id,
                    customer_name,
                    source
                );
                Err(SubmitError::CustomerNotRecorded {
                    job_id,
                    source: *source,
                })
            }
            Err(e) => {
                log::error!("Error creating job {}: {}", job_id, e);
                Err(SubmitError::Store(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::FailureMode;
    use crate::store::MemoryStore;

    fn complete_draft() -> JobDraft {
        JobDraft::new()
            .with(FormField::JobId, "J100")
            .with(FormField::Date, "2026-10-17")
            .with(FormField::Location, "Sandeep Enterprises")
            .with(FormField::CustomerName, "NewCo")
            .with(FormField::Phone, "555-0100")
            .with(FormField::City, "Pune")
            .with(FormField::Poc, "R. Shah")
            .with(FormField::Brand, "Haas")
            .with(FormField::Model, "VF-2")
    }

    fn coordinator(store: Arc<MemoryStore>) -> SubmissionCoordinator {
        SubmissionCoordinator::new(store, &Config::default())
    }

    #[test]
    fn test_build_job_reports_first_missing_field() {
        let draft = complete_draft()
            .with(FormField::Phone, "   ")
            .with(FormField::Model, "");
        assert!(matches!(
            build_job(&draft),
            Err(SubmitError::MissingField(FormField::Phone))
        ));
    }

    #[test]
    fn test_build_job_rejects_bad_choices() {
        let bad_loc = complete_draft().with(FormField::Location, "Moon");
        assert!(matches!(
            build_job(&bad_loc),
            Err(SubmitError::InvalidValue { field: FormField::Location, .. })
        ));

        let bad_date = complete_draft().with(FormField::Date, "17/10/2026");
        assert!(matches!(
            build_job(&bad_date),
            Err(SubmitError::InvalidValue { field: FormField::Date, .. })
        ));

        let bad_status = complete_draft().with(FormField::CallStatus, "Maybe");
        assert!(matches!(
            build_job(&bad_status),
            Err(SubmitError::InvalidValue { field: FormField::CallStatus, .. })
        ));
    }

    #[test]
    fn test_build_job_trims_and_filters() {
        let mut draft = complete_draft()
            .with(FormField::CustomerName, "  NewCo ")
            .with(FormField::CallStatus, "Outside Warranty");
        draft.add_engineer_slot();
        draft.add_engineer_slot();
        draft.set_engineer_at(1, "b@x.io").unwrap();

        let job = build_job(&draft).unwrap();
        assert_eq!(job.customer_name, "NewCo");
        assert_eq!(job.engineers, vec!["b@x.io".to_string()]);
        assert_eq!(job.call_status, Some(CallStatus::OutsideWarranty));
        assert_eq!(job.status, JobStatus::NotInspected);
        assert_eq!(job.jdate, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }

    #[tokio::test]
    async fn test_submit_writes_job_then_customer() {
        let store = Arc::new(MemoryStore::new());
        let outcome = coordinator(Arc::clone(&store))
            .submit(&complete_draft())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Created(JobReceipt {
                job_id: "J100".to_string(),
                customer_name: "NewCo".to_string(),
                customer_created: true,
            })
        );
        let job: Job = store.documents("jobs")[0].decode().unwrap();
        assert_eq!(job.status, JobStatus::NotInspected);
        assert!(job.created_at.is_some());
        assert_eq!(store.documents("customers")[0].id, "NewCo");
    }

    #[tokio::test]
    async fn test_validation_error_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let draft = complete_draft().with(FormField::JobId, "");
        let err = coordinator(Arc::clone(&store))
            .submit(&draft)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Job ID is required.");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_and_guard_released() {
        let store = Arc::new(MemoryStore::new());
        store.fail_collection("jobs", FailureMode::Writes);
        let coordinator = coordinator(Arc::clone(&store));

        let err = coordinator.submit(&complete_draft()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Store(_)));
        assert!(!coordinator.is_submitting());

        store.clear_failures();
        assert!(coordinator.submit(&complete_draft()).await.is_ok());
    }

    #[tokio::test]
    async fn test_reject_existing_policy() {
        let store = Arc::new(MemoryStore::new());
        let mut config = Config::default();
        config.submission.job_write_policy = JobWritePolicy::RejectExisting;
        let coordinator = SubmissionCoordinator::new(store.clone(), &config);

        coordinator.submit(&complete_draft()).await.unwrap();
        let err = coordinator
            .submit(&complete_draft().with(FormField::Brand, "Mazak"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::DuplicateJob(ref id) if id == "J100"));
        assert_eq!(store.documents("jobs")[0].get_str("brand"), Some("Haas"));
    }

    #[test]
    fn test_notice_messages() {
        let created = Notice::Created {
            job_id: "J100".to_string(),
        };
        assert_eq!(created.to_string(), "Job created successfully! ID: J100");
        assert!(created.is_success());
        assert_eq!(
            Notice::MissingField(FormField::Poc).to_string(),
            "POC is required."
        );
        assert_eq!(
            Notice::Failed.to_string(),
            "Failed to create job. Please try again."
        );
        assert_eq!(Notice::from_result(&Ok(SubmitOutcome::Skipped)), None);
    }
}
