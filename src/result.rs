//! Outcomes of facade operations

use thiserror::Error;

use crate::status::OsStatus;

/// Result of adding an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddingResult {
    /// Item stored
    Success,
    /// An item with the same key already exists; use `update_value` or
    /// `save_value` instead
    DuplicateDetected,
    /// Any other status, carried verbatim
    Failure(OsStatus),
}

/// Result of updating or removing an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    Success,
    Failure(OsStatus),
}

/// Result of searching items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult<T> {
    Success(T),
    /// Nothing matches the key and accessibility. The accessibility must equal
    /// the one the item was stored with.
    NotFound,
    Failure(OsStatus),
}

/// Error form of the domain results, for callers that prefer `?`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Item already exists")]
    Duplicate,
    #[error("Item not found")]
    NotFound,
    #[error("Secure storage error: {0}")]
    Status(OsStatus),
}

impl StorageError {
    /// Status code the service reported for this error
    pub fn status(&self) -> OsStatus {
        match self {
            StorageError::Duplicate => OsStatus::DUPLICATE_ITEM,
            StorageError::NotFound => OsStatus::ITEM_NOT_FOUND,
            StorageError::Status(status) => *status,
        }
    }
}

impl AddingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AddingResult::Success)
    }

    pub fn into_result(self) -> Result<(), StorageError> {
        match self {
            AddingResult::Success => Ok(()),
            AddingResult::DuplicateDetected => Err(StorageError::Duplicate),
            AddingResult::Failure(status) => Err(StorageError::Status(status)),
        }
    }
}

impl UpdateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateResult::Success)
    }

    pub fn into_result(self) -> Result<(), StorageError> {
        match self {
            UpdateResult::Success => Ok(()),
            UpdateResult::Failure(status) => Err(StorageError::Status(status)),
        }
    }
}

impl<T> SearchResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchResult::Success(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SearchResult<U> {
        match self {
            SearchResult::Success(value) => SearchResult::Success(f(value)),
            SearchResult::NotFound => SearchResult::NotFound,
            SearchResult::Failure(status) => SearchResult::Failure(status),
        }
    }

    pub fn into_result(self) -> Result<T, StorageError> {
        match self {
            SearchResult::Success(value) => Ok(value),
            SearchResult::NotFound => Err(StorageError::NotFound),
            SearchResult::Failure(status) => Err(StorageError::Status(status)),
        }
    }

    /// Like [`into_result`](Self::into_result) but treats `NotFound` as `Ok(None)`
    pub fn into_option(self) -> Result<Option<T>, StorageError> {
        match self {
            SearchResult::Success(value) => Ok(Some(value)),
            SearchResult::NotFound => Ok(None),
            SearchResult::Failure(status) => Err(StorageError::Status(status)),
        }
    }
}
