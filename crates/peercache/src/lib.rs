// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Named cache groups with peer-aware loading and stampede protection.
//!
//! A [`Group`] is a cache namespace. Reading a key goes through three layers:
//!
//! 1. The group's local [`Store`], by default a byte-bounded [`MemoryStore`].
//! 2. The remote [`Peer`] that owns the key, chosen by the group's [`PeerPicker`].
//! 3. The group's [`Getter`], which produces the value from the source of truth.
//!
//! Concurrent misses for the same key are coalesced with [`uniflight`], so the peer or the
//! getter sees a single request no matter how many callers are waiting. Values loaded by the
//! getter are added to the local store; values served by a peer are not, since the peer
//! already caches them.
//!
//! Groups are created and looked up through a [`Registry`].
//!
//! # Quick Start
//!
//! ```
//! use peercache::{BoxError, Registry, getter_fn};
//! # futures::executor::block_on(async {
//!
//! let registry = Registry::new();
//! registry.new_group(
//!     "scores",
//!     2 << 10,
//!     getter_fn(|key: String| async move {
//!         match key.as_str() {
//!             "Tom" => Ok(b"630".to_vec()),
//!             "Jack" => Ok(b"589".to_vec()),
//!             _ => Err::<_, BoxError>(format!("{key} not exist").into()),
//!         }
//!     }),
//! )?;
//!
//! let scores = registry.get_group("scores").expect("registered above");
//! assert_eq!(scores.get("Jack").await?.as_string(), "589");
//!
//! // Served from the local store this time.
//! assert_eq!(scores.get("Jack").await?.as_string(), "589");
//! assert_eq!(scores.stats().cache_hits, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
//!
//! # Peers
//!
//! Distribution is plugged in through two small traits. A [`PeerPicker`] maps a key to the
//! [`Peer`] that owns it, and a [`PeerGetter`] performs the remote call. A failing peer is
//! logged at `warn` level and the group falls back to its own getter.
//!
//! # Logging
//!
//! Groups emit [`tracing`] events: `debug` for cache hits, loads and registrations, and
//! `warn` for peer failures. Every event carries the `group` field, and per-key events also
//! carry `key`.

mod builder;
mod error;
mod getter;
mod group;
mod peers;
mod registry;
mod stats;

#[doc(inline)]
pub use builder::GroupBuilder;
#[doc(inline)]
pub use error::{BoxError, ConfigError, Error};
#[doc(inline)]
pub use getter::{Getter, GetterFn, getter_fn};
#[doc(inline)]
pub use group::Group;
#[doc(inline)]
pub use peercache_memory::{MemoryStore, MemoryStoreBuilder};
#[doc(inline)]
pub use peercache_store::{ByteView, OutOfRange, Store};
#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use peercache_store::testing::{MockStore, StoreOp};
#[doc(inline)]
pub use peers::{FetchRequest, FetchResponse, Peer, PeerGetter, PeerPicker};
#[doc(inline)]
pub use registry::Registry;
#[doc(inline)]
pub use stats::Stats;
#[doc(inline)]
pub use uniflight::LeaderPanicked;
