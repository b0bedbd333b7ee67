//! In-process emulation of generic-password item semantics
//!
//! Shared by the in-memory and dev-file providers. Items are attribute maps
//! keyed by raw platform key; the secret bytes live under `v_Data`.

use serde::{Deserialize, Serialize};

use crate::query::{constants, Attribute, Attributes, ItemValue, Query, QueryValue};
use crate::status::OsStatus;

/// Attributes that make an item unique
const IDENTITY: [Attribute; 4] = [
    Attribute::Class,
    Attribute::Service,
    Attribute::AccessGroup,
    Attribute::Account,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemTable {
    items: Vec<Attributes>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Attributes] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn add(&mut self, query: &Query) -> OsStatus {
        if !query.contains(Attribute::Class) {
            return OsStatus::PARAM;
        }

        let item: Attributes = query
            .iter()
            .filter(|(attr, _)| attr.is_item_attribute())
            .map(|(attr, value)| (attr.as_str().to_string(), value.clone()))
            .collect();

        let duplicate = self.items.iter().any(|existing| {
            IDENTITY
                .iter()
                .all(|attr| existing.get(attr.as_str()) == item.get(attr.as_str()))
        });
        if duplicate {
            return OsStatus::DUPLICATE_ITEM;
        }

        self.items.push(item);
        OsStatus::SUCCESS
    }

    pub fn copy_matching(&self, query: &Query) -> (OsStatus, Option<ItemValue>) {
        if !query.contains(Attribute::Class) {
            return (OsStatus::PARAM, None);
        }

        let found: Vec<&Attributes> = self.items.iter().filter(|item| matches(item, query)).collect();
        if found.is_empty() {
            return (OsStatus::ITEM_NOT_FOUND, None);
        }

        let return_data = query.get_bool(Attribute::ReturnData).unwrap_or(false);
        let return_attributes = query.get_bool(Attribute::ReturnAttributes).unwrap_or(false);
        let shape = |item: &Attributes| -> Option<ItemValue> {
            if return_attributes {
                let mut attributes = item.clone();
                if !return_data {
                    attributes.remove(Attribute::ValueData.as_str());
                }
                Some(ItemValue::Attributes(attributes))
            } else if return_data {
                item.get(Attribute::ValueData.as_str())
                    .and_then(QueryValue::as_data)
                    .map(|data| ItemValue::Data(data.to_vec()))
            } else {
                None
            }
        };

        let result = if query.get_str(Attribute::MatchLimit) == Some(constants::MATCH_LIMIT_ALL) {
            Some(ItemValue::Array(found.into_iter().filter_map(shape).collect()))
        } else {
            shape(found[0])
        };
        (OsStatus::SUCCESS, result)
    }

    pub fn update(&mut self, query: &Query, attributes_to_update: &Query) -> OsStatus {
        if !query.contains(Attribute::Class) {
            return OsStatus::PARAM;
        }

        let mut updated = 0usize;
        for item in self.items.iter_mut().filter(|item| matches(item, query)) {
            for (attr, value) in attributes_to_update.iter() {
                item.insert(attr.as_str().to_string(), value.clone());
            }
            updated += 1;
        }

        if updated == 0 {
            OsStatus::ITEM_NOT_FOUND
        } else {
            OsStatus::SUCCESS
        }
    }

    pub fn delete(&mut self, query: &Query) -> OsStatus {
        if !query.contains(Attribute::Class) {
            return OsStatus::PARAM;
        }

        let before = self.items.len();
        self.items.retain(|item| !matches(item, query));

        if self.items.len() == before {
            OsStatus::ITEM_NOT_FOUND
        } else {
            OsStatus::SUCCESS
        }
    }
}

/// Every item attribute present in the query must be equal on the item.
/// Secret bytes are never used for matching.
fn matches(item: &Attributes, query: &Query) -> bool {
    query
        .iter()
        .filter(|(attr, _)| attr.is_item_attribute() && *attr != Attribute::ValueData)
        .all(|(attr, value)| item.get(attr.as_str()) == Some(value))
}
