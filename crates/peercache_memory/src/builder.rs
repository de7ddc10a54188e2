// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.
//!
//! This module provides a builder API for `MemoryStore` that abstracts
//! the underlying moka configuration, providing a stable API surface
//! without exposing moka's types.

use crate::store::MemoryStore;

/// Builder for configuring a `MemoryStore`.
///
/// # Examples
///
/// ```
/// use peercache_memory::MemoryStore;
///
/// let store = MemoryStore::builder()
///     .max_bytes(64 * 1024 * 1024)
///     .initial_capacity(1024)
///     .name("scores")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStoreBuilder {
    pub(crate) max_bytes: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl MemoryStoreBuilder {
    /// Creates a new builder for an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte budget of the store.
    ///
    /// Each entry weighs the length of its key plus the length of its value. Once the
    /// budget is exceeded, entries are evicted using moka's `TinyLFU` policy. A budget of
    /// `0` leaves the store unbounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use peercache_memory::MemoryStore;
    ///
    /// let store = MemoryStore::builder().max_bytes(2 << 10).build();
    /// ```
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = (max_bytes > 0).then_some(max_bytes);
        self
    }

    /// Sets the initial capacity (pre-allocation hint, in entries) for the store.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store.
    ///
    /// This name may appear in logs or debugging output from the
    /// underlying cache implementation.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured `MemoryStore`.
    #[must_use]
    pub fn build(self) -> MemoryStore {
        MemoryStore::from_builder(&self)
    }
}
