// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.

use moka::sync::Cache;
use peercache_store::{ByteView, Store};

use crate::builder::MemoryStoreBuilder;

/// An in-memory [`Store`] backed by moka, bounded by a byte budget.
///
/// Clones share the same underlying cache.
///
/// # Examples
///
/// ```
/// use peercache_memory::MemoryStore;
/// use peercache_store::{ByteView, Store};
///
/// let store = MemoryStore::with_max_bytes(1024);
/// store.add("Tom", ByteView::from("630"));
/// assert_eq!(store.get("Tom"), Some(ByteView::from("630")));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Cache<String, ByteView>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a new unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a store that holds at most `max_bytes` of keys and values.
    ///
    /// A budget of `0` leaves the store unbounded.
    #[must_use]
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self::builder().max_bytes(max_bytes).build()
    }

    /// Creates a new builder for configuring a store.
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryStoreBuilder) -> Self {
        let mut moka_builder = Cache::builder().weigher(|key: &String, value: &ByteView| weight(key.len(), value.len()));

        if let Some(max_bytes) = builder.max_bytes {
            moka_builder = moka_builder.max_capacity(max_bytes);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Returns the total weight, in bytes, of the entries currently held.
    ///
    /// Like the entry count, this is eventually consistent; call
    /// [`run_pending_tasks`](Self::run_pending_tasks) first for an exact figure.
    #[must_use]
    pub fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    /// Applies pending maintenance such as evictions.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

fn weight(key_len: usize, value_len: usize) -> u32 {
    u32::try_from(key_len.saturating_add(value_len)).unwrap_or(u32::MAX)
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.get(key)
    }

    fn add(&self, key: &str, value: ByteView) {
        self.inner.insert(key.to_owned(), value);
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}
