// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Byte-bounded in-memory store backed by moka.
//!
//! This crate provides [`MemoryStore`], a concurrent in-memory [`Store`](peercache_store::Store)
//! using moka's `TinyLFU` eviction algorithm. Entries are weighed by the length of their key
//! plus the length of their value, so the configured budget is expressed in bytes. Use
//! [`MemoryStoreBuilder`] to configure it without exposing moka types directly.
//!
//! # Quick Start
//!
//! ```
//! use peercache_memory::MemoryStoreBuilder;
//! use peercache_store::{ByteView, Store};
//!
//! let store = MemoryStoreBuilder::new().max_bytes(1 << 20).build();
//!
//! store.add("key", ByteView::from("value"));
//! assert_eq!(store.get("key").unwrap().as_string(), "value");
//! ```

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::MemoryStoreBuilder;
#[doc(inline)]
pub use store::MemoryStore;
