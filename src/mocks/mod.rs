//! Test doubles for dependency injection
//!
//! Provides in-memory implementations of the data provider for isolated testing.

use std::sync::{Arc, Mutex};

use crate::item_table::ItemTable;
use crate::query::{Attributes, ItemValue, Query};
use crate::status::OsStatus;
use crate::traits::SecuredDataProvider;

// ============================================================================
// InMemoryDataProvider
// ============================================================================

/// In-memory data provider for testing
///
/// Behaves like the secure store (duplicate detection, accessibility-aware
/// matching) without any keychain interaction. Clones share the same items.
#[derive(Clone, Default)]
pub struct InMemoryDataProvider {
    table: Arc<Mutex<ItemTable>>,
}

impl InMemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored item (for assertions)
    pub fn items(&self) -> Vec<Attributes> {
        self.table.lock().unwrap().items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all items
    pub fn clear(&self) {
        self.table.lock().unwrap().clear();
    }
}

impl SecuredDataProvider for InMemoryDataProvider {
    fn add_item(&self, query: &Query) -> OsStatus {
        match self.table.lock() {
            Ok(mut table) => table.add(query),
            Err(_) => OsStatus::INTERNAL_COMPONENT,
        }
    }

    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        match self.table.lock() {
            Ok(table) => table.copy_matching(query),
            Err(_) => (OsStatus::INTERNAL_COMPONENT, None),
        }
    }

    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        match self.table.lock() {
            Ok(mut table) => table.update(query, attributes_to_update),
            Err(_) => OsStatus::INTERNAL_COMPONENT,
        }
    }

    fn delete_item(&self, query: &Query) -> OsStatus {
        match self.table.lock() {
            Ok(mut table) => table.delete(query),
            Err(_) => OsStatus::INTERNAL_COMPONENT,
        }
    }
}

// ============================================================================
// RecordingDataProvider
// ============================================================================

/// A single call observed by [`RecordingDataProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Add(Query),
    CopyMatching(Query),
    Update { query: Query, attributes_to_update: Query },
    Delete(Query),
}

impl ProviderCall {
    /// The search/identity query of the call
    pub fn query(&self) -> &Query {
        match self {
            ProviderCall::Add(query)
            | ProviderCall::CopyMatching(query)
            | ProviderCall::Update { query, .. }
            | ProviderCall::Delete(query) => query,
        }
    }
}

#[derive(Debug, Clone)]
struct Script {
    add: OsStatus,
    copy: OsStatus,
    copy_result: Option<ItemValue>,
    update: OsStatus,
    delete: OsStatus,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            add: OsStatus::SUCCESS,
            copy: OsStatus::SUCCESS,
            copy_result: None,
            update: OsStatus::SUCCESS,
            delete: OsStatus::SUCCESS,
        }
    }
}

/// Recording data provider for testing
///
/// Records every call and answers with scripted statuses (success by default).
#[derive(Clone, Default)]
pub struct RecordingDataProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    script: Arc<Mutex<Script>>,
}

impl RecordingDataProvider {
    /// Always succeed with no find result
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_add_status(self, status: OsStatus) -> Self {
        self.script.lock().unwrap().add = status;
        self
    }

    pub fn with_copy_response(self, status: OsStatus, result: Option<ItemValue>) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.copy = status;
            script.copy_result = result;
        }
        self
    }

    pub fn with_update_status(self, status: OsStatus) -> Self {
        self.script.lock().unwrap().update = status;
        self
    }

    pub fn with_delete_status(self, status: OsStatus) -> Self {
        self.script.lock().unwrap().delete = status;
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get number of calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Query of the most recent call
    pub fn last_query(&self) -> Option<Query> {
        self.calls.lock().unwrap().last().map(|call| call.query().clone())
    }

    /// Clear recorded calls
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SecuredDataProvider for RecordingDataProvider {
    fn add_item(&self, query: &Query) -> OsStatus {
        self.record(ProviderCall::Add(query.clone()));
        self.script.lock().unwrap().add
    }

    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        self.record(ProviderCall::CopyMatching(query.clone()));
        let script = self.script.lock().unwrap();
        (script.copy, script.copy_result.clone())
    }

    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        self.record(ProviderCall::Update {
            query: query.clone(),
            attributes_to_update: attributes_to_update.clone(),
        });
        self.script.lock().unwrap().update
    }

    fn delete_item(&self, query: &Query) -> OsStatus {
        self.record(ProviderCall::Delete(query.clone()));
        self.script.lock().unwrap().delete
    }
}

// ============================================================================
// Tests
// ============================================================================
