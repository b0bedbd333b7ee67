//! File-based data provider for development builds
//!
//! Avoids Keychain prompts and entitlement requirements while iterating on a
//! host application. Items are kept in a plain JSON file and behave like
//! generic-password items (duplicate detection, accessibility matching).
//!
//! WARNING: Not secure. Secrets are written to disk unencrypted.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::item_table::ItemTable;
use crate::query::{ItemValue, Query};
use crate::status::OsStatus;
use crate::traits::SecuredDataProvider;

#[derive(Debug, Error)]
enum FlushError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct DevFileDataProvider {
    path: PathBuf,
    table: Mutex<ItemTable>,
}

impl DevFileDataProvider {
    /// Open the item file at `path`; a missing or unreadable file starts empty
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table = load(&path);
        Self {
            path,
            table: Mutex::new(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, table: &ItemTable) -> Result<(), FlushError> {
        let content = serde_json::to_string_pretty(table)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Run a mutation and persist the table when it succeeded
    fn mutate(&self, op: impl FnOnce(&mut ItemTable) -> OsStatus) -> OsStatus {
        let Ok(mut table) = self.table.lock() else {
            return OsStatus::INTERNAL_COMPONENT;
        };

        let snapshot = table.clone();
        let status = op(&mut table);
        if status.is_success() {
            if let Err(e) = self.flush(&table) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to flush dev item file");
                *table = snapshot;
                return OsStatus::IO;
            }
        }
        status
    }
}

fn load(path: &Path) -> ItemTable {
    if !path.exists() {
        return ItemTable::new();
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(FlushError::from)
        .and_then(|content| serde_json::from_str::<ItemTable>(&content).map_err(FlushError::from));

    match parsed {
        Ok(table) => {
            tracing::debug!(path = %path.display(), count = table.len(), "Loaded dev item file");
            table
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable dev item file");
            ItemTable::new()
        }
    }
}

impl SecuredDataProvider for DevFileDataProvider {
    fn add_item(&self, query: &Query) -> OsStatus {
        self.mutate(|table| table.add(query))
    }

    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        match self.table.lock() {
            Ok(table) => table.copy_matching(query),
            Err(_) => (OsStatus::INTERNAL_COMPONENT, None),
        }
    }

    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        self.mutate(|table| table.update(query, attributes_to_update))
    }

    fn delete_item(&self, query: &Query) -> OsStatus {
        self.mutate(|table| table.delete(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{constants, Attribute};

    fn add_query(account: &str, value: &[u8]) -> Query {
        Query::new()
            .with(Attribute::Class, constants::CLASS_GENERIC_PASSWORD)
            .with(Attribute::Service, "svc")
            .with(Attribute::Account, account)
            .with(Attribute::ValueData, value)
    }

    fn lookup(account: &str) -> Query {
        Query::new()
            .with(Attribute::Class, constants::CLASS_GENERIC_PASSWORD)
            .with(Attribute::Service, "svc")
            .with(Attribute::Account, account)
            .with(Attribute::ReturnData, true)
    }

    #[test]
    fn test_items_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let provider = DevFileDataProvider::new(&path);
        assert_eq!(provider.add_item(&add_query("k", b"secret")), OsStatus::SUCCESS);
        assert!(path.exists());

        let reopened = DevFileDataProvider::new(&path);
        assert_eq!(
            reopened.copy_item_matching(&lookup("k")),
            (OsStatus::SUCCESS, Some(ItemValue::Data(b"secret".to_vec())))
        );
        assert_eq!(reopened.add_item(&add_query("k", b"again")), OsStatus::DUPLICATE_ITEM);
    }

    #[test]
    fn test_failed_mutation_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let provider = DevFileDataProvider::new(&path);
        assert_eq!(provider.delete_item(&lookup("missing")), OsStatus::ITEM_NOT_FOUND);
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "not json").unwrap();

        let provider = DevFileDataProvider::new(&path);
        assert_eq!(provider.path(), path.as_path());
        assert_eq!(provider.copy_item_matching(&lookup("k")), (OsStatus::ITEM_NOT_FOUND, None));
    }

    #[test]
    fn test_unwritable_path_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("items.json");

        let provider = DevFileDataProvider::new(&path);
        assert_eq!(provider.add_item(&add_query("k", b"v")), OsStatus::IO);
        // Rolled back, so a retry is not a duplicate
        assert_eq!(provider.add_item(&add_query("k", b"v")), OsStatus::IO);
    }
}
