// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recording store for tests.
//!
//! This module provides `MockStore`, an unbounded in-memory store that records every
//! operation so tests can verify exactly how a group used its local store.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{ByteView, Store};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A lookup was performed with the given key.
    Get(String),
    /// A value was added under the given key.
    Add {
        /// The key that was added.
        key: String,
        /// The value that was added.
        value: ByteView,
    },
}

/// A recording store for testing.
///
/// Clones share the same data and the same operation log, so a test can hand one clone to
/// a group and keep another for assertions.
///
/// # Examples
///
/// ```
/// use peercache_store::{ByteView, Store, testing::{MockStore, StoreOp}};
///
/// let store = MockStore::new();
/// store.add("key", ByteView::from("value"));
/// assert_eq!(store.get("key"), Some(ByteView::from("value")));
///
/// assert_eq!(store.operations(), vec![
///     StoreOp::Add { key: "key".to_string(), value: ByteView::from("value") },
///     StoreOp::Get("key".to_string()),
/// ]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    data: Arc<Mutex<HashMap<String, ByteView>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock store with pre-populated data.
    #[must_use]
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ByteView>,
    {
        let data = data.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::default(),
        }
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Returns the recorded `Add` operations only.
    #[must_use]
    pub fn additions(&self) -> Vec<StoreOp> {
        self.operations
            .lock()
            .iter()
            .filter(|op| matches!(op, StoreOp::Add { .. }))
            .cloned()
            .collect()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().push(op);
    }
}

impl Store for MockStore {
    fn get(&self, key: &str) -> Option<ByteView> {
        self.record(StoreOp::Get(key.to_owned()));
        self.data.lock().get(key).cloned()
    }

    fn add(&self, key: &str, value: ByteView) {
        self.record(StoreOp::Add {
            key: key.to_owned(),
            value: value.clone(),
        });
        self.data.lock().insert(key.to_owned(), value);
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
