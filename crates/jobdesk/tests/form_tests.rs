//! Form state, engineer slots and customer autocomplete.

mod common;

use std::time::{Duration, Instant};

use jobdesk::config::Config;
use jobdesk::form::{suggestions, FormField, JobDraft, SuggestionBox, MAX_ENGINEERS};
use jobdesk::store::memory::FailureMode;
use jobdesk::JobForm;

use common::{seeded_store, TestHarness};

#[test]
fn test_engineer_slot_bounds() {
    let mut draft = JobDraft::new();
    for _ in 0..10 {
        draft.add_engineer_slot();
        assert!(draft.engineers().len() <= MAX_ENGINEERS);
    }
    assert_eq!(draft.engineers().len(), MAX_ENGINEERS);

    for index in (0..10).rev() {
        let _ = draft.remove_engineer_slot(index);
        assert!(!draft.engineers().is_empty());
    }
    assert_eq!(draft.engineers().len(), 1);
}

#[test]
fn test_remove_slot_shifts_later_values() {
    let mut draft = JobDraft::new();
    draft.add_engineer_slot();
    draft.add_engineer_slot();
    draft.set_engineer_at(0, "a@x.io").unwrap();
    draft.set_engineer_at(1, "b@x.io").unwrap();
    draft.set_engineer_at(2, "c@x.io").unwrap();

    assert_eq!(draft.remove_engineer_slot(1).unwrap(), "b@x.io");
    assert_eq!(draft.engineers(), &["a@x.io", "c@x.io"]);
}

#[test]
fn test_autocomplete_filter_order() {
    let names = vec![
        "Acme Corp".to_string(),
        "Acme Labs".to_string(),
        "Zenith".to_string(),
    ];
    let matched: Vec<&str> = suggestions("acme", &names).collect();
    assert_eq!(matched, vec!["Acme Corp", "Acme Labs"]);

    let upper: Vec<&str> = suggestions("LABS", &names).collect();
    assert_eq!(upper, vec!["Acme Labs"]);

    assert_eq!(suggestions("", &names).count(), 3);
    assert_eq!(suggestions("nothing", &names).count(), 0);
}

#[test]
fn test_suggestion_box_blur_grace() {
    let mut suggestion_box = SuggestionBox::new(Duration::from_millis(150));
    let start = Instant::now();

    assert!(!suggestion_box.is_visible(start, "ac"));
    suggestion_box.focus();
    assert!(suggestion_box.is_visible(start, "ac"));
    assert!(!suggestion_box.is_visible(start, ""));

    suggestion_box.blur(start);
    assert!(suggestion_box.is_visible(start + Duration::from_millis(100), "ac"));
    assert!(!suggestion_box.is_visible(start + Duration::from_millis(150), "ac"));

    suggestion_box.edited();
    assert!(suggestion_box.is_visible(start + Duration::from_millis(500), "ac"));
}

#[tokio::test]
async fn test_form_loads_reference_data() {
    let harness = TestHarness::new().await;

    let emails: Vec<String> = harness
        .form
        .engineer_options()
        .into_iter()
        .map(|e| e.email)
        .collect();
    assert_eq!(emails, vec!["asha@x.io", "ravi@x.io"]);

    harness.form.focus_customer();
    harness.form.edit_customer("e");
    assert_eq!(harness.form.customer_suggestions(), vec!["Acme Corp", "Zenith"]);
}

#[tokio::test]
async fn test_form_opens_when_engineers_fail() {
    let store = seeded_store();
    store.fail_collection("users", FailureMode::Reads);
    let form = JobForm::open(std::sync::Arc::new(store), &Config::default()).await;

    assert!(form.engineer_options().is_empty());
    form.edit_customer("zen");
    assert_eq!(form.customer_suggestions(), vec!["Zenith"]);
}

#[tokio::test]
async fn test_blur_then_select_within_grace() {
    let harness = TestHarness::new().await;
    let form = &harness.form;
    let now = Instant::now();

    form.focus_customer();
    form.edit_customer("acme");
    form.blur_customer(now);
    assert!(form.suggestions_visible(now + Duration::from_millis(50)));

    form.select_customer("Acme Corp");
    assert_eq!(form.draft().get(FormField::CustomerName), "Acme Corp");
    assert!(!form.suggestions_visible(now + Duration::from_millis(50)));
}
