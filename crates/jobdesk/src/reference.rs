//! Reference data for the job form: existing customer names and the
//! engineers that can be assigned.

use tracing::info_span;
use tracing::Instrument;

use crate::config::CollectionsConfig;
use crate::error::StoreError;
use crate::model::{EngineerOption, ENGINEER_ROLE};
use crate::store::{DocumentStore, FieldFilter};

/// Cached lists used by autocomplete and engineer assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    customers: Vec<String>,
    engineers: Vec<EngineerOption>,
}

impl ReferenceData {
    pub fn new(customers: Vec<String>, engineers: Vec<EngineerOption>) -> Self {
        Self {
            customers,
            engineers,
        }
    }

    /// Loads both lists concurrently. A failed read leaves its list empty.
    pub async fn load<S>(store: &S, collections: &CollectionsConfig) -> Self
    where
        S: DocumentStore + ?Sized,
    {
        let span = info_span!("reference.load");
        async {
            let (customers, engineers) = tokio::join!(
                fetch_customer_names(store, &collections.customers),
                fetch_engineers(store, &collections.users),
            );

            let customers = customers.unwrap_or_else(|e| {
                log::warn!("Failed to load customers: {}", e);
                Vec::new()
            });
            let engineers = engineers.unwrap_or_else(|e| {
                log::error!("Error fetching engineers: {}", e);
                Vec::new()
            });

            log::debug!(
                "Loaded {} customer(s) and {} engineer(s)",
                customers.len(),
                engineers.len()
            );
            Self::new(customers, engineers)
        }
        .instrument(span)
        .await
    }

    pub fn customers(&self) -> &[String] {
        &self.customers
    }

    pub fn engineers(&self) -> &[EngineerOption] {
        &self.engineers
    }

    /// Adds a newly created customer so suggestions include it without a
    /// reload. Returns false if the name was already known.
    pub fn remember_customer(&mut self, name: &str) -> bool {
        if self.customers.iter().any(|c| c == name) {
            return false;
        }
        self.customers.push(name.to_string());
        true
    }
}

/// Keys of every customer document.
pub async fn fetch_customer_names<S>(store: &S, collection: &str) -> Result<Vec<String>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let docs = store.read_collection(collection).await?;
    Ok(docs.into_iter().map(|d| d.id).collect())
}

/// Registered users with the engineer role, projected to name and email.
pub async fn fetch_engineers<S>(
    store: &S,
    collection: &str,
) -> Result<Vec<EngineerOption>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let filters = [
        FieldFilter::equals("role", ENGINEER_ROLE),
        FieldFilter::equals("isRegistered", true),
    ];
    let docs = store.read_filtered(collection, &filters).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| {
            let option = EngineerOption::from_user(doc);
            if option.is_none() {
                log::debug!("Skipping engineer '{}' without an email", doc.id);
            }
            option
        })
        .collect())
}
