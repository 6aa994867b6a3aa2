//! The job intake form: draft state, customer autocomplete, engineer
//! assignment and submission, behind one handle.

pub mod autocomplete;
pub mod draft;

pub use autocomplete::{suggestions, SuggestionBox, Suggestions, DEFAULT_BLUR_GRACE};
pub use draft::{FormField, JobDraft, MAX_ENGINEERS};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use crate::config::Config;
use crate::error::FormError;
use crate::model::EngineerOption;
use crate::reference::ReferenceData;
use crate::store::DocumentStore;
use crate::submission::{Notice, SubmissionCoordinator, SubmitOutcome};

/// A live job form bound to a document store.
///
/// All methods take `&self`; the form can be shared behind an `Arc`
/// between the task driving input and the one submitting.
pub struct JobForm {
    draft: Mutex<JobDraft>,
    reference: RwLock<ReferenceData>,
    suggestion_box: Mutex<SuggestionBox>,
    coordinator: SubmissionCoordinator,
}

impl JobForm {
    /// Opens a blank form, loading customers and engineers first.
    pub async fn open(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        let reference = ReferenceData::load(store.as_ref(), &config.collections).await;
        Self::with_reference(store, config, reference)
    }

    pub fn with_reference(
        store: Arc<dyn DocumentStore>,
        config: &Config,
        reference: ReferenceData,
    ) -> Self {
        Self {
            draft: Mutex::new(JobDraft::new()),
            reference: RwLock::new(reference),
            suggestion_box: Mutex::new(SuggestionBox::new(config.autocomplete.blur_grace())),
            coordinator: SubmissionCoordinator::new(store, config),
        }
    }

    fn lock_draft(&self) -> MutexGuard<'_, JobDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_box(&self) -> MutexGuard<'_, SuggestionBox> {
        self.suggestion_box
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> JobDraft {
        self.lock_draft().clone()
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.lock_draft().set_field(field, value);
    }

    pub fn set_engineer_at(&self, index: usize, email: impl Into<String>) -> Result<(), FormError> {
        self.lock_draft().set_engineer_at(index, email)
    }

    pub fn add_engineer_slot(&self) -> bool {
        self.lock_draft().add_engineer_slot()
    }

    pub fn remove_engineer_slot(&self, index: usize) -> Result<String, FormError> {
        self.lock_draft().remove_engineer_slot(index)
    }

    /// Engineers offered in every assignment slot.
    pub fn engineer_options(&self) -> Vec<EngineerOption> {
        self.reference
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .engineers()
            .to_vec()
    }

    /// Known customer names matching the current customer-name input.
    pub fn customer_suggestions(&self) -> Vec<String> {
        let input = self.lock_draft().get(FormField::CustomerName).to_string();
        let reference = self.reference.read().unwrap_or_else(PoisonError::into_inner);
        suggestions(&input, reference.customers())
            .map(str::to_string)
            .collect()
    }

    pub fn focus_customer(&self) {
        self.lock_box().focus();
    }

    /// Customer-name input changed.
    pub fn edit_customer(&self, value: impl Into<String>) {
        self.lock_draft().set_field(FormField::CustomerName, value);
        self.lock_box().edited();
    }

    /// A suggestion was picked from the list.
    pub fn select_customer(&self, name: &str) {
        let value = self.lock_box().select(name).to_string();
        self.lock_draft().set_field(FormField::CustomerName, value);
    }

    pub fn blur_customer(&self, now: Instant) {
        self.lock_box().blur(now);
    }

    pub fn suggestions_visible(&self, now: Instant) -> bool {
        let input = self.lock_draft().get(FormField::CustomerName).to_string();
        self.lock_box().is_visible(now, &input)
    }

    pub fn is_submitting(&self) -> bool {
        self.coordinator.is_submitting()
    }

    /// Submits the current draft.
    ///
    /// On success the draft is reset and the customer becomes a suggestion.
    /// On failure the draft is kept as typed. Returns `None` when a
    /// submission was already in flight.
    pub async fn submit(&self) -> Option<Notice> {
        let snapshot = self.draft();
        let result = self.coordinator.submit(&snapshot).await;

        if let Ok(SubmitOutcome::Created(receipt)) = &result {
            self.lock_draft().reset();
            self.lock_box().hide();
            self.reference
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remember_customer(&receipt.customer_name);
        }

        let notice = Notice::from_result(&result);
        if let Some(notice) = &notice {
            if notice.is_success() {
                log::info!("{}", notice);
            } else {
                log::warn!("Job form: {}", notice);
            }
        }
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn form_with(customers: &[&str]) -> JobForm {
        let reference = ReferenceData::new(
            customers.iter().map(|c| c.to_string()).collect(),
            vec![EngineerOption {
                name: "Asha".to_string(),
                email: "asha@x.io".to_string(),
            }],
        );
        JobForm::with_reference(Arc::new(MemoryStore::new()), &Config::default(), reference)
    }

    #[test]
    fn test_customer_suggestions_follow_input() {
        let form = form_with(&["Acme Corp", "Zenith", "Acme Labs"]);
        form.focus_customer();
        form.edit_customer("acme");

        assert_eq!(form.customer_suggestions(), vec!["Acme Corp", "Acme Labs"]);
        assert!(form.suggestions_visible(Instant::now()));
    }

    #[test]
    fn test_select_customer_fills_input_and_hides() {
        let form = form_with(&["Acme Corp"]);
        form.focus_customer();
        form.edit_customer("ac");
        form.select_customer("Acme Corp");

        assert_eq!(form.draft().get(FormField::CustomerName), "Acme Corp");
        assert!(!form.suggestions_visible(Instant::now()));
    }

    #[test]
    fn test_engineer_slots_through_form() {
        let form = form_with(&[]);
        assert!(form.add_engineer_slot());
        assert!(form.add_engineer_slot());
        assert!(!form.add_engineer_slot());
        assert_eq!(form.remove_engineer_slot(0), Err(FormError::PrimarySlot));
        assert_eq!(form.engineer_options()[0].email, "asha@x.io");
    }

    #[tokio::test]
    async fn test_submit_missing_field_keeps_draft() {
        let form = form_with(&[]);
        form.set_field(FormField::JobId, "J1");

        let notice = form.submit().await;
        assert_eq!(notice, Some(Notice::MissingField(FormField::Date)));
        assert_eq!(form.draft().get(FormField::JobId), "J1");
    }
}
