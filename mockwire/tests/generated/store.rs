// vim: tw=80
//! A key-value store trait, its real implementation, and its generated mock.
//!
//! `mock_store.rs` is generated from this file by `mockwire_gen`.  Its golden
//! test fails if the two fall out of sync.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use mockwire::{Arg, MockError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item {
    pub key: String,
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreError {
    NotFound(String),
    Mock(MockError),
}

impl From<MockError> for StoreError {
    fn from(e: MockError) -> Self {
        StoreError::Mock(e)
    }
}

pub trait Store {
    fn flush(&self);
    fn get(&self, key: &str) -> Result<Item, StoreError>;
    fn log(&self, level: u8, fields: impl IntoIterator<Item = Arg>);
    fn put(&mut self, item: Item, ttl: Duration) -> Result<(), StoreError>;
    fn stats(&self) -> (usize, usize, u64, f64, bool);
    fn tags(&self, keys: &[String]) -> HashMap<String, Vec<String>>;
    fn touch(&self, keys: impl IntoIterator<Item = String>);
}

/// The real thing, used as a passthrough target.
#[derive(Debug, Default)]
pub struct MemStore {
    pub items: Mutex<HashMap<String, Item>>,
    pub touched: Mutex<Vec<String>>,
}

impl MemStore {
    pub fn with(items: &[(&str, u32)]) -> Self {
        let store = MemStore::default();
        for (key, value) in items {
            store.items.lock().unwrap().insert(key.to_string(), Item {
                key: key.to_string(),
                value: *value
            });
        }
        store
    }
}

impl Store for MemStore {
    fn flush(&self) {}

    fn get(&self, key: &str) -> Result<Item, StoreError> {
        self.items.lock().unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    fn log(&self, _level: u8, _fields: impl IntoIterator<Item = Arg>) {}

    fn put(&mut self, item: Item, _ttl: Duration) -> Result<(), StoreError> {
        self.items.lock().unwrap().insert(item.key.clone(), item);
        Ok(())
    }

    fn stats(&self) -> (usize, usize, u64, f64, bool) {
        let n = self.items.lock().unwrap().len();
        (n, self.touched.lock().unwrap().len(), 0, 0.0, true)
    }

    fn tags(&self, keys: &[String]) -> HashMap<String, Vec<String>> {
        keys.iter()
            .map(|k| (k.clone(), vec![format!("tag-{}", k)]))
            .collect()
    }

    fn touch(&self, keys: impl IntoIterator<Item = String>) {
        self.touched.lock().unwrap().extend(keys);
    }
}

include!("mock_store.rs");
