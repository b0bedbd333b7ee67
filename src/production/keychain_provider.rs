//! Keychain data provider for Apple platforms.
//!
//! Converts queries into CoreFoundation dictionaries and hands them to the
//! Security framework's `SecItem*` functions unchanged. Find results come back
//! as raw data, attribute dictionaries, or arrays of either.

use std::ptr;

use core_foundation::array::CFArray;
use core_foundation::base::{CFType, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::data::CFData;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use core_foundation_sys::array::CFArrayRef;
use core_foundation_sys::base::CFTypeRef;
use core_foundation_sys::data::CFDataRef;
use core_foundation_sys::dictionary::CFDictionaryRef;
use core_foundation_sys::number::CFBooleanRef;
use core_foundation_sys::string::CFStringRef;
use security_framework_sys::keychain_item::{SecItemAdd, SecItemCopyMatching, SecItemDelete, SecItemUpdate};

use crate::query::{Attributes, ItemValue, Query, QueryValue};
use crate::status::OsStatus;
use crate::traits::SecuredDataProvider;

#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainDataProvider;

impl KeychainDataProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecuredDataProvider for KeychainDataProvider {
    fn add_item(&self, query: &Query) -> OsStatus {
        let dictionary = to_dictionary(query);
        let status = OsStatus(unsafe { SecItemAdd(dictionary.as_concrete_TypeRef(), ptr::null_mut()) });
        tracing::debug!(status = status.code(), "SecItemAdd");
        status
    }

    fn copy_item_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        let dictionary = to_dictionary(query);
        let mut result: CFTypeRef = ptr::null();
        let status = OsStatus(unsafe { SecItemCopyMatching(dictionary.as_concrete_TypeRef(), &mut result) });
        tracing::debug!(status = status.code(), "SecItemCopyMatching");

        if result.is_null() {
            return (status, None);
        }
        let owned = unsafe { CFType::wrap_under_create_rule(result) };
        (status, from_cf(&owned))
    }

    fn update_item(&self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        let dictionary = to_dictionary(query);
        let attributes = to_dictionary(attributes_to_update);
        let status = OsStatus(unsafe {
            SecItemUpdate(dictionary.as_concrete_TypeRef(), attributes.as_concrete_TypeRef())
        });
        tracing::debug!(status = status.code(), "SecItemUpdate");
        status
    }

    fn delete_item(&self, query: &Query) -> OsStatus {
        let dictionary = to_dictionary(query);
        let status = OsStatus(unsafe { SecItemDelete(dictionary.as_concrete_TypeRef()) });
        tracing::debug!(status = status.code(), "SecItemDelete");
        status
    }
}

fn to_dictionary(query: &Query) -> CFDictionary<CFString, CFType> {
    let pairs: Vec<(CFString, CFType)> = query
        .iter()
        .map(|(attr, value)| (CFString::new(attr.as_str()), to_cf(value)))
        .collect();
    CFDictionary::from_CFType_pairs(&pairs)
}

fn to_cf(value: &QueryValue) -> CFType {
    match value {
        QueryValue::String(s) => CFString::new(s).into_CFType(),
        QueryValue::Data(d) => CFData::from_buffer(d).into_CFType(),
        QueryValue::Bool(b) => CFBoolean::from(*b).into_CFType(),
    }
}

fn from_cf(value: &CFType) -> Option<ItemValue> {
    let type_id = value.type_of();
    let raw = value.as_CFTypeRef();

    if type_id == <CFData as TCFType>::type_id() {
        let data = unsafe { CFData::wrap_under_get_rule(raw as CFDataRef) };
        Some(ItemValue::Data(data.bytes().to_vec()))
    } else if type_id == <CFDictionary as TCFType>::type_id() {
        let dictionary: CFDictionary = unsafe { CFDictionary::wrap_under_get_rule(raw as CFDictionaryRef) };
        Some(ItemValue::Attributes(to_attributes(&dictionary)))
    } else if type_id == <CFArray as TCFType>::type_id() {
        let array: CFArray<CFType> = unsafe { CFArray::wrap_under_get_rule(raw as CFArrayRef) };
        Some(ItemValue::Array(array.iter().filter_map(|item| from_cf(&item)).collect()))
    } else {
        None
    }
}

/// String-keyed entries with string, data or boolean values; dates, numbers
/// and other value types are skipped
fn to_attributes(dictionary: &CFDictionary) -> Attributes {
    let (keys, values) = dictionary.get_keys_and_values();

    keys.into_iter()
        .zip(values)
        .filter_map(|(key, value)| {
            let key = unsafe { CFType::wrap_under_get_rule(key as CFTypeRef) };
            if key.type_of() != <CFString as TCFType>::type_id() {
                return None;
            }
            let key = unsafe { CFString::wrap_under_get_rule(key.as_CFTypeRef() as CFStringRef) };
            let value = unsafe { CFType::wrap_under_get_rule(value as CFTypeRef) };
            to_query_value(&value).map(|value| (key.to_string(), value))
        })
        .collect()
}

fn to_query_value(value: &CFType) -> Option<QueryValue> {
    let type_id = value.type_of();
    let raw = value.as_CFTypeRef();

    if type_id == <CFString as TCFType>::type_id() {
        let string = unsafe { CFString::wrap_under_get_rule(raw as CFStringRef) };
        Some(QueryValue::String(string.to_string()))
    } else if type_id == <CFData as TCFType>::type_id() {
        let data = unsafe { CFData::wrap_under_get_rule(raw as CFDataRef) };
        Some(QueryValue::Data(data.bytes().to_vec()))
    } else if type_id == <CFBoolean as TCFType>::type_id() {
        let boolean = unsafe { CFBoolean::wrap_under_get_rule(raw as CFBooleanRef) };
        Some(QueryValue::Bool(bool::from(boolean)))
    } else {
        None
    }
}
