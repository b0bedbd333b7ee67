//! Data provider trait: the seam between the facade and the secure store

use crate::query::{ItemValue, Query};
use crate::status::OsStatus;

/// Pass-through to a secure credential service
///
/// Production: Keychain via Security framework, or the `keyring` crate
/// Testing: in-memory item table, recording spy
#[cfg_attr(test, mockall::automock)]
pub trait SecuredDataProvider: Send + Sync {
    /// Add a new item described by `query`
    fn add_item(&self, query: &Query) -> OsStatus;

    /// Find items matching `query`; the result shape depends on the
    /// match-limit and return flags in the query
    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>);

    /// Apply `attributes_to_update` to every item matching `query`
    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus;

    /// Delete every item matching `query`
    fn delete_item(&self, query: &Query) -> OsStatus;
}
