//! Query dictionaries exchanged with the secure credential service
//!
//! Attribute keys and constant values use the raw platform strings, so a
//! binding can hand them to the service without translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Platform constant values used inside queries
pub mod constants {
    pub const CLASS_GENERIC_PASSWORD: &str = "genp";
    pub const MATCH_LIMIT_ONE: &str = "m_LimitOne";
    pub const MATCH_LIMIT_ALL: &str = "m_LimitAll";

    pub const ACCESSIBLE_WHEN_UNLOCKED: &str = "ak";
    pub const ACCESSIBLE_WHEN_UNLOCKED_THIS_DEVICE_ONLY: &str = "aku";
    pub const ACCESSIBLE_AFTER_FIRST_UNLOCK: &str = "ck";
    pub const ACCESSIBLE_AFTER_FIRST_UNLOCK_THIS_DEVICE_ONLY: &str = "cku";
    pub const ACCESSIBLE_WHEN_PASSCODE_SET_THIS_DEVICE_ONLY: &str = "akpu";
}

/// Attribute names a query may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Class,
    Accessible,
    Service,
    AccessGroup,
    Account,
    ValueData,
    MatchLimit,
    ReturnData,
    ReturnAttributes,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Class,
        Attribute::Accessible,
        Attribute::Service,
        Attribute::AccessGroup,
        Attribute::Account,
        Attribute::ValueData,
        Attribute::MatchLimit,
        Attribute::ReturnData,
        Attribute::ReturnAttributes,
    ];

    /// Raw platform key
    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Class => "class",
            Attribute::Accessible => "pdmn",
            Attribute::Service => "svce",
            Attribute::AccessGroup => "agrp",
            Attribute::Account => "acct",
            Attribute::ValueData => "v_Data",
            Attribute::MatchLimit => "m_Limit",
            Attribute::ReturnData => "r_Data",
            Attribute::ReturnAttributes => "r_Attributes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.as_str() == key)
    }

    /// Attributes stored on an item, as opposed to search/return controls
    pub const fn is_item_attribute(self) -> bool {
        matches!(
            self,
            Attribute::Class
                | Attribute::Accessible
                | Attribute::Service
                | Attribute::AccessGroup
                | Attribute::Account
                | Attribute::ValueData
        )
    }
}

/// A single value inside a query or an attribute map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QueryValue {
    String(String),
    Data(Vec<u8>),
    Bool(bool),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            QueryValue::Data(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<&[u8]> for QueryValue {
    fn from(value: &[u8]) -> Self {
        QueryValue::Data(value.to_vec())
    }
}

impl From<Vec<u8>> for QueryValue {
    fn from(value: Vec<u8>) -> Self {
        QueryValue::Data(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// Ephemeral request dictionary, built fresh for every provider call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: BTreeMap<Attribute, QueryValue>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from optional entries, dropping every absent value
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Attribute, Option<QueryValue>)>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(attr, value)| value.map(|v| (attr, v)))
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, attr: Attribute, value: impl Into<QueryValue>) {
        self.entries.insert(attr, value.into());
    }

    pub fn with(mut self, attr: Attribute, value: impl Into<QueryValue>) -> Self {
        self.insert(attr, value);
        self
    }

    pub fn get(&self, attr: Attribute) -> Option<&QueryValue> {
        self.entries.get(&attr)
    }

    pub fn get_str(&self, attr: Attribute) -> Option<&str> {
        self.get(attr).and_then(QueryValue::as_str)
    }

    pub fn get_data(&self, attr: Attribute) -> Option<&[u8]> {
        self.get(attr).and_then(QueryValue::as_data)
    }

    pub fn get_bool(&self, attr: Attribute) -> Option<bool> {
        self.get(attr).and_then(QueryValue::as_bool)
    }

    pub fn contains(&self, attr: Attribute) -> bool {
        self.entries.contains_key(&attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &QueryValue)> {
        self.entries.iter().map(|(attr, value)| (*attr, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Attribute map of a stored item, keyed by raw platform key
pub type Attributes = BTreeMap<String, QueryValue>;

/// Opaque result of a find request; its shape depends on the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    Data(Vec<u8>),
    Attributes(Attributes),
    Array(Vec<ItemValue>),
}
