// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Values and local storage for peercache groups.
//!
//! This crate defines [`ByteView`], the immutable value type a cache group stores and hands
//! out, and the [`Store`] trait a group uses for its local cache layer.
//!
//! # Implementing a Store
//!
//! A store only needs a lookup and an insert. It must be safe to call from many threads at
//! once:
//!
//! ```
//! use peercache_store::{ByteView, Store};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleStore(RwLock<HashMap<String, ByteView>>);
//!
//! impl Store for SimpleStore {
//!     fn get(&self, key: &str) -> Option<ByteView> {
//!         self.0.read().unwrap().get(key).cloned()
//!     }
//!
//!     fn add(&self, key: &str, value: ByteView) {
//!         self.0.write().unwrap().insert(key.to_string(), value);
//!     }
//! }
//! ```
//!
//! The `peercache_memory` crate provides a bounded store backed by moka.

pub mod error;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
mod view;

#[doc(inline)]
pub use error::OutOfRange;
#[doc(inline)]
pub use store::Store;
#[doc(inline)]
pub use view::ByteView;
