/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Byte-keyed value storage, the unit of contract state.
//!
//! One `Storage` backs each of the three evaluation scopes: the contract's persisted global
//! storage, each counterparty's private local storage, and the method-scoped temp storage.
//! Variable names address entries by their UTF-8 bytes.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::value::Value;

/// A storage key: the UTF-8 bytes of a variable name.
pub type Key = Vec<u8>;

/// An ordered map from keys to values.
#[derive(Clone, Debug, Default, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Storage(BTreeMap<Key, Value>);

impl Storage {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name.as_bytes())
    }

    pub fn put(&mut self, name: &str, value: Value) {
        self.0.insert(name.as_bytes().to_vec(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Storage {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into_bytes(), value))
                .collect(),
        )
    }
}
