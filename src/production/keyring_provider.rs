//! Cross-platform data provider on top of the `keyring` crate.
//!
//! Dispatches to the OS credential store (Keychain, kernel keyutils on Linux,
//! Windows Credential Manager). `keyring` addresses one entry per
//! (service, user), so only single-item requests are supported: the query's
//! service becomes the entry service (as `<group>/<service>` when an access
//! group is set) and the account becomes the entry user. Accessibility is not
//! expressible through `keyring` and is ignored.
//!
//! Hosts where `keyring` has no native backend get its per-entry mock store,
//! which persists nothing; every request then reports `NOT_AVAILABLE`.

use std::borrow::Cow;
use std::sync::{Mutex, PoisonError};

use keyring::mock::MockCredential;
use keyring::Entry;

use crate::query::{constants, Attribute, ItemValue, Query};
use crate::status::OsStatus;
use crate::traits::SecuredDataProvider;

/// Serializes check-then-write sequences within this process
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Data provider over the OS credential store
///
/// `keyring` has no atomic create, so add is a lookup followed by a write.
/// Writers in this process are serialized, so concurrent adds of one key see
/// exactly one success. Another process writing the same entry between the
/// lookup and the write can still be overwritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringDataProvider;

impl KeyringDataProvider {
    pub fn new() -> Self {
        Self
    }

    /// Whether `keyring` resolves to a real credential store on this host
    pub fn has_native_backend() -> bool {
        Entry::new("secured-storage", "backend-check")
            .map(|entry| !is_mock(&entry))
            .unwrap_or(false)
    }

    fn entry(query: &Query) -> Result<Entry, OsStatus> {
        if !query.contains(Attribute::Class) {
            return Err(OsStatus::PARAM);
        }
        let service = query.get_str(Attribute::Service).ok_or(OsStatus::PARAM)?;
        let account = query.get_str(Attribute::Account).ok_or(OsStatus::PARAM)?;
        let service = entry_service(service, query.get_str(Attribute::AccessGroup));

        let entry = Entry::new(&service, account).map_err(|e| {
            tracing::warn!(service = %service, error = %e, "Failed to create keyring entry");
            status_for(&e)
        })?;
        native(entry)
    }
}

/// Entry service name for a query service and optional access group.
///
/// `%` and `/` are escaped in both parts so `/` only ever separates the group
/// from the service.
fn entry_service(service: &str, access_group: Option<&str>) -> String {
    match access_group {
        Some(group) => format!("{}/{}", escape(group), escape(service)),
        None => escape(service).into_owned(),
    }
}

fn escape(part: &str) -> Cow<'_, str> {
    if part.contains(['%', '/']) {
        Cow::Owned(part.replace('%', "%25").replace('/', "%2F"))
    } else {
        Cow::Borrowed(part)
    }
}

fn is_mock(entry: &Entry) -> bool {
    entry.get_credential().is::<MockCredential>()
}

/// Reject entries backed by the in-process mock store
fn native(entry: Entry) -> Result<Entry, OsStatus> {
    if is_mock(&entry) {
        tracing::warn!("No native keyring backend on this host");
        return Err(OsStatus::NOT_AVAILABLE);
    }
    Ok(entry)
}

/// Map a `keyring` error onto the closest secure-store status
fn status_for(error: &keyring::Error) -> OsStatus {
    match error {
        keyring::Error::NoEntry => OsStatus::ITEM_NOT_FOUND,
        keyring::Error::NoStorageAccess(_) => OsStatus::INTERACTION_NOT_ALLOWED,
        keyring::Error::BadEncoding(_) | keyring::Error::TooLong(..) | keyring::Error::Invalid(..) => {
            OsStatus::PARAM
        }
        _ => OsStatus::INTERNAL_COMPONENT,
    }
}

fn add_secret(entry: &Entry, data: &[u8]) -> OsStatus {
    let _guard = WRITE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    match entry.get_secret() {
        Ok(_) => OsStatus::DUPLICATE_ITEM,
        Err(keyring::Error::NoEntry) => match entry.set_secret(data) {
            Ok(()) => OsStatus::SUCCESS,
            Err(e) => status_for(&e),
        },
        Err(e) => status_for(&e),
    }
}

fn update_secret(entry: &Entry, data: &[u8]) -> OsStatus {
    let _guard = WRITE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    match entry.get_secret() {
        Ok(_) => match entry.set_secret(data) {
            Ok(()) => OsStatus::SUCCESS,
            Err(e) => status_for(&e),
        },
        Err(e) => status_for(&e),
    }
}

impl SecuredDataProvider for KeyringDataProvider {
    fn add_item(&self, query: &Query) -> OsStatus {
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        let Some(data) = query.get_data(Attribute::ValueData) else {
            return OsStatus::PARAM;
        };

        let status = add_secret(&entry, data);
        tracing::debug!(status = status.code(), "Keyring add");
        status
    }

    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        if query.get_str(Attribute::MatchLimit) == Some(constants::MATCH_LIMIT_ALL) {
            tracing::debug!("Keyring cannot enumerate entries");
            return (OsStatus::UNIMPLEMENTED, None);
        }
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return (status, None),
        };

        match entry.get_secret() {
            Ok(secret) => {
                tracing::debug!("Keyring lookup hit");
                let result = query
                    .get_bool(Attribute::ReturnData)
                    .unwrap_or(false)
                    .then(|| ItemValue::Data(secret));
                (OsStatus::SUCCESS, result)
            }
            Err(e) => {
                let status = status_for(&e);
                tracing::debug!(status = status.code(), "Keyring lookup miss");
                (status, None)
            }
        }
    }

    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        let Some(data) = attributes_to_update.get_data(Attribute::ValueData) else {
            return OsStatus::PARAM;
        };

        let status = update_secret(&entry, data);
        tracing::debug!(status = status.code(), "Keyring update");
        status
    }

    fn delete_item(&self, query: &Query) -> OsStatus {
        let entry = match Self::entry(query) {
            Ok(entry) => entry,
            Err(status) => return status,
        };

        let status = match entry.delete_credential() {
            Ok(()) => OsStatus::SUCCESS,
            Err(e) => status_for(&e),
        };
        tracing::debug!(status = status.code(), "Keyring delete");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query::new()
            .with(Attribute::Class, constants::CLASS_GENERIC_PASSWORD)
            .with(Attribute::Service, "secured-storage-test")
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(status_for(&keyring::Error::NoEntry), OsStatus::ITEM_NOT_FOUND);
        assert_eq!(
            status_for(&keyring::Error::Invalid("user".into(), "empty".into())),
            OsStatus::PARAM
        );
        assert_eq!(status_for(&keyring::Error::TooLong("user".into(), 10)), OsStatus::PARAM);
        assert_eq!(status_for(&keyring::Error::BadEncoding(vec![0xff])), OsStatus::PARAM);
    }

    #[test]
    fn test_requires_class_and_account() {
        let provider = KeyringDataProvider::new();

        let without_class = Query::new()
            .with(Attribute::Service, "svc")
            .with(Attribute::Account, "k");
        assert_eq!(provider.delete_item(&without_class), OsStatus::PARAM);

        assert_eq!(provider.delete_item(&query()), OsStatus::PARAM);
        assert_eq!(provider.copy_item_matching(&query()), (OsStatus::PARAM, None));
    }

    #[test]
    fn test_match_all_is_unimplemented() {
        let provider = KeyringDataProvider::new();
        let all = query().with(Attribute::MatchLimit, constants::MATCH_LIMIT_ALL);
        assert_eq!(provider.copy_item_matching(&all), (OsStatus::UNIMPLEMENTED, None));
    }

    fn mock_entry() -> Entry {
        Entry::new_with_credential(Box::new(
            MockCredential::default(),
        ))
    }

    #[test]
    #[cfg(any(target_vendor = "apple", target_os = "linux", target_os = "windows"))]
    fn test_supported_hosts_resolve_a_native_backend() {
        assert!(KeyringDataProvider::has_native_backend());

        let entry = KeyringDataProvider::entry(&query().with(Attribute::Account, "k")).unwrap();
        assert!(!is_mock(&entry));
    }

    #[test]
    fn test_mock_backend_is_not_available() {
        assert_eq!(native(mock_entry()).err(), Some(OsStatus::NOT_AVAILABLE));
    }

    #[test]
    fn test_entry_service_is_unambiguous() {
        assert_eq!(entry_service("svc", None), "svc");
        assert_eq!(entry_service("svc", Some("TEAM.com.example")), "TEAM.com.example/svc");

        assert_ne!(entry_service("c", Some("a.b")), entry_service("b.c", Some("a")));
        assert_ne!(entry_service("b/c", Some("a")), entry_service("c", Some("a/b")));
        assert_ne!(entry_service("a/b", None), entry_service("b", Some("a")));
        assert_ne!(entry_service("a%2Fb", None), entry_service("a/b", None));
    }

    #[test]
    fn test_concurrent_adds_detect_duplicate() {
        let entry = mock_entry();

        let statuses: Vec<OsStatus> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|i| {
                    let entry = &entry;
                    scope.spawn(move || add_secret(entry, &[i]))
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        let added = statuses.iter().filter(|status| **status == OsStatus::SUCCESS).count();
        let duplicates = statuses
            .iter()
            .filter(|status| **status == OsStatus::DUPLICATE_ITEM)
            .count();
        assert_eq!((added, duplicates), (1, 7));
    }

    #[test]
    fn test_update_requires_existing_secret() {
        let entry = mock_entry();
        assert_eq!(update_secret(&entry, b"v"), OsStatus::ITEM_NOT_FOUND);
        assert_eq!(add_secret(&entry, b"v"), OsStatus::SUCCESS);
        assert_eq!(update_secret(&entry, b"w"), OsStatus::SUCCESS);
        assert_eq!(entry.get_secret().unwrap(), b"w".to_vec());
    }

    #[test]
    #[ignore] // Requires actual keychain access
    fn test_keyring_roundtrip() {
        let provider = KeyringDataProvider::new();
        let item = query().with(Attribute::Account, "roundtrip");

        provider.delete_item(&item);
        assert_eq!(
            provider.add_item(&item.clone().with(Attribute::ValueData, b"one".to_vec())),
            OsStatus::SUCCESS
        );
        assert_eq!(
            provider.add_item(&item.clone().with(Attribute::ValueData, b"two".to_vec())),
            OsStatus::DUPLICATE_ITEM
        );

        let update = Query::new().with(Attribute::ValueData, b"two".to_vec());
        assert_eq!(provider.update_item(&item, &update), OsStatus::SUCCESS);

        let lookup = item.clone().with(Attribute::ReturnData, true);
        assert_eq!(
            provider.copy_item_matching(&lookup),
            (OsStatus::SUCCESS, Some(ItemValue::Data(b"two".to_vec())))
        );

        assert_eq!(provider.delete_item(&item), OsStatus::SUCCESS);
        assert_eq!(provider.delete_item(&item), OsStatus::ITEM_NOT_FOUND);
    }
}
