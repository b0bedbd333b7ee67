//! Secured storage facade
//!
//! Builds provider queries from keys, values and accessibility, and maps the
//! returned status codes into domain results. Every call is a single
//! request/response cycle against the provider, except `save_value`, which
//! falls back from add to update.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::accessibility::Accessibility;
use crate::production;
use crate::query::{constants, Attribute, ItemValue, Query, QueryValue};
use crate::result::{AddingResult, SearchResult, UpdateResult};
use crate::status::OsStatus;
use crate::traits::SecuredDataProvider;

/// Key/value secret storage scoped to a service name and optional access group
#[derive(Clone)]
pub struct SecuredStorage {
    name: String,
    access_group: Option<String>,
    data_provider: Arc<dyn SecuredDataProvider>,
}

impl SecuredStorage {
    /// Storage backed by the host platform's secure credential service.
    ///
    /// `access_group` shares items between related applications; pass `None`
    /// to keep them private to this one.
    pub fn new(name: impl Into<String>, access_group: Option<String>) -> Self {
        Self::with_provider(name, access_group, production::platform_provider())
    }

    pub fn with_provider(
        name: impl Into<String>,
        access_group: Option<String>,
        data_provider: Arc<dyn SecuredDataProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            access_group,
            data_provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    // ---- Add / Update / Save ----

    pub fn add_value(&self, key: &str, value: &[u8], accessibility: Accessibility) -> AddingResult {
        let query = self
            .base_query(accessibility)
            .with(Attribute::Account, key)
            .with(Attribute::ValueData, value);

        match self.data_provider.add_item(&query) {
            OsStatus::DUPLICATE_ITEM => AddingResult::DuplicateDetected,
            OsStatus::SUCCESS => AddingResult::Success,
            status => AddingResult::Failure(status),
        }
    }

    pub fn update_value(&self, key: &str, value: &[u8], accessibility: Accessibility) -> UpdateResult {
        let query = self.base_query(accessibility).with(Attribute::Account, key);
        let attributes_to_update = Query::new().with(Attribute::ValueData, value);

        match self.data_provider.update_item(&query, &attributes_to_update) {
            OsStatus::SUCCESS => UpdateResult::Success,
            status => UpdateResult::Failure(status),
        }
    }

    /// Add the value, or update it when the key already exists
    pub fn save_value(&self, key: &str, value: &[u8], accessibility: Accessibility) -> UpdateResult {
        match self.add_value(key, value, accessibility) {
            AddingResult::Success => UpdateResult::Success,
            AddingResult::DuplicateDetected => self.update_value(key, value, accessibility),
            AddingResult::Failure(status) => UpdateResult::Failure(status),
        }
    }

    // ---- Search ----

    /// Look up one value. A successful lookup whose result is not raw data
    /// yields `Success(None)`.
    pub fn search_value(&self, key: &str, accessibility: Accessibility) -> SearchResult<Option<Vec<u8>>> {
        let query = self
            .base_query(accessibility)
            .with(Attribute::Account, key)
            .with(Attribute::MatchLimit, constants::MATCH_LIMIT_ONE)
            .with(Attribute::ReturnData, true);

        match self.data_provider.copy_item_matching(&query) {
            (OsStatus::ITEM_NOT_FOUND, _) => SearchResult::NotFound,
            (OsStatus::SUCCESS, item) => SearchResult::Success(match item {
                Some(ItemValue::Data(data)) => Some(data),
                _ => None,
            }),
            (status, _) => SearchResult::Failure(status),
        }
    }

    /// Every key/value stored under this service, group and accessibility.
    ///
    /// Entries missing an account or data are skipped.
    pub fn search_all_values(
        &self,
        accessibility: Accessibility,
    ) -> SearchResult<Option<HashMap<String, Vec<u8>>>> {
        let query = self
            .base_query(accessibility)
            .with(Attribute::MatchLimit, constants::MATCH_LIMIT_ALL)
            .with(Attribute::ReturnAttributes, true)
            .with(Attribute::ReturnData, true);

        match self.data_provider.copy_item_matching(&query) {
            (OsStatus::ITEM_NOT_FOUND, _) => SearchResult::NotFound,
            (OsStatus::SUCCESS, item) => SearchResult::Success(collect_values(item)),
            (status, _) => SearchResult::Failure(status),
        }
    }

    // ---- Remove ----

    /// Delete the value. Removing a missing key succeeds.
    pub fn remove_value(&self, key: &str, accessibility: Accessibility) -> UpdateResult {
        let query = self.base_query(accessibility).with(Attribute::Account, key);

        match self.data_provider.delete_item(&query) {
            OsStatus::SUCCESS | OsStatus::ITEM_NOT_FOUND => UpdateResult::Success,
            status => UpdateResult::Failure(status),
        }
    }

    fn base_query(&self, accessibility: Accessibility) -> Query {
        Query::from_entries([
            (Attribute::Class, Some(QueryValue::from(constants::CLASS_GENERIC_PASSWORD))),
            (Attribute::Accessible, Some(QueryValue::from(accessibility.query_value()))),
            (Attribute::Service, Some(QueryValue::from(self.name.as_str()))),
            (Attribute::AccessGroup, self.access_group.as_deref().map(QueryValue::from)),
        ])
    }
}

impl fmt::Debug for SecuredStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuredStorage")
            .field("name", &self.name)
            .field("access_group", &self.access_group)
            .finish_non_exhaustive()
    }
}

/// Extract `(account, data)` pairs from a match-all result
fn collect_values(item: Option<ItemValue>) -> Option<HashMap<String, Vec<u8>>> {
    let Some(ItemValue::Array(entries)) = item else {
        return None;
    };

    let values = entries
        .into_iter()
        .filter_map(|entry| match entry {
            ItemValue::Attributes(mut attributes) => {
                let account = attributes.remove(Attribute::Account.as_str())?;
                let data = attributes.remove(Attribute::ValueData.as_str())?;
                match (account, data) {
                    (QueryValue::String(account), QueryValue::Data(data)) => Some((account, data)),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect();

    Some(values)
}
