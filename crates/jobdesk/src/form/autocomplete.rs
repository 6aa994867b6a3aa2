//! Customer-name autocomplete.

use std::time::{Duration, Instant};

/// Default delay between losing focus and hiding the list, long enough
/// for a pointer press on a suggestion to register first.
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(150);

/// Iterator over names containing the input, case-insensitively.
///
/// Lazy and `Clone`, so the same query can be walked more than once.
#[derive(Debug, Clone)]
pub struct Suggestions<'a> {
    needle: String,
    names: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Suggestions<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.names
            .by_ref()
            .find(|name| name.to_lowercase().contains(needle.as_str()))
            .map(String::as_str)
    }
}

/// Names from `names` whose lowercase form contains the lowercase `input`,
/// in source order. An empty input matches every name.
pub fn suggestions<'a>(input: &str, names: &'a [String]) -> Suggestions<'a> {
    Suggestions {
        needle: input.to_lowercase(),
        names: names.iter(),
    }
}

/// Visibility state of the suggestion list under the customer-name input.
#[derive(Debug, Clone)]
pub struct SuggestionBox {
    open: bool,
    hide_at: Option<Instant>,
    grace: Duration,
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_GRACE)
    }
}

impl SuggestionBox {
    pub fn new(grace: Duration) -> Self {
        Self {
            open: false,
            hide_at: None,
            grace,
        }
    }

    /// Input gained focus.
    pub fn focus(&mut self) {
        self.open = true;
        self.hide_at = None;
    }

    /// Input text changed.
    pub fn edited(&mut self) {
        self.focus();
    }

    /// A suggestion was picked. Returns the value to write into the draft.
    pub fn select<'a>(&mut self, name: &'a str) -> &'a str {
        self.hide();
        name
    }

    /// Input lost focus; the list stays up for the grace period.
    pub fn blur(&mut self, now: Instant) {
        if self.open {
            self.hide_at = Some(now + self.grace);
        }
    }

    pub fn hide(&mut self) {
        self.open = false;
        self.hide_at = None;
    }

    /// Whether the list should be shown for `input` at `now`.
    pub fn is_visible(&self, now: Instant, input: &str) -> bool {
        let expired = self.hide_at.is_some_and(|at| now >= at);
        self.open && !expired && !input.is_empty()
    }
}
