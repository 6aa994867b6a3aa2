//! Job intake for a field-service desk.
//!
//! A [`JobForm`] holds the draft a coordinator is filling in, offers
//! customer autocomplete and engineer slots, and submits through a
//! [`SubmissionCoordinator`] that validates the draft and writes the job
//! and any new customer to a [`DocumentStore`] in one batch.
//! [`MemoryStore`] keeps documents in process; [`SqliteStore`] keeps them
//! in a SQLite file. [`RoleRedirectGuard`] maps the signed-in role to a
//! [`View`].
//!
//! Configuration is loaded with [`load_config`] and checked against the
//! bundled JSON schema; [`init_logging`] installs the `tracing` subscriber.
//!
//! ```
//! use std::sync::Arc;
//!
//! use jobdesk::{Config, FormField, JobForm, MemoryStore, Notice};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let form = JobForm::open(Arc::new(MemoryStore::new()), &Config::default()).await;
//! for (field, value) in [
//!     (FormField::JobId, "J7"),
//!     (FormField::Date, "2026-10-17"),
//!     (FormField::Location, "Customer Location"),
//!     (FormField::CustomerName, "Acme Corp"),
//!     (FormField::Phone, "555-0100"),
//!     (FormField::City, "Pune"),
//!     (FormField::Poc, "R. Shah"),
//!     (FormField::Brand, "Haas"),
//!     (FormField::Model, "VF-2"),
//! ] {
//!     form.set_field(field, value);
//! }
//!
//! let notice = form.submit().await;
//! assert_eq!(notice, Some(Notice::Created { job_id: "J7".to_string() }));
//! assert!(form.draft().is_blank());
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod model;
pub mod redirect;
pub mod reference;
pub mod store;
pub mod submission;
pub mod telemetry;

pub use config::{load_config, Config};
pub use error::{ConfigError, FormError, JobdeskError, Result, StoreError, SubmitError};
pub use form::{FormField, JobDraft, JobForm};
pub use model::{CallStatus, Customer, EngineerOption, Job, JobStatus, ServiceLocation};
pub use redirect::{redirect_for, Navigator, RoleRedirectGuard, View};
pub use reference::ReferenceData;
pub use store::{DocumentStore, MemoryStore, SqliteStore};
pub use submission::{Notice, SubmissionCoordinator, SubmitOutcome};
pub use telemetry::init_logging;
