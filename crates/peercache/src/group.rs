// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache group: local store, peers, getter and stampede protection.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use peercache_store::{ByteView, Store};
use uniflight::Merger;

use crate::{
    BoxError, ConfigError, Error, Getter,
    getter::DynGetter,
    peers::{FetchRequest, Peer, PeerPicker},
    stats::{Counters, Stats},
};

/// A named cache namespace with its own getter and local store.
///
/// On [`get`](Self::get), a group consults its local store first. On a miss it loads the
/// value, either from the peer that owns the key or, failing that, from its getter.
/// Concurrent misses for the same key share a single load.
///
/// Groups are created through a [`Registry`](crate::Registry) and shared as `Arc<Group>`.
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, Registry, getter_fn};
/// # futures::executor::block_on(async {
///
/// let registry = Registry::new();
/// let scores = registry.new_group(
///     "scores",
///     2 << 10,
///     getter_fn(|key: String| async move {
///         match key.as_str() {
///             "Tom" => Ok(b"630".to_vec()),
///             _ => Err::<_, BoxError>(format!("{key} not exist").into()),
///         }
///     }),
/// )?;
///
/// assert_eq!(scores.get("Tom").await?.as_string(), "630");
/// assert!(scores.get("unknown").await.is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
pub struct Group {
    name: String,
    getter: Arc<DynGetter<'static>>,
    store: Box<dyn Store>,
    peers: OnceLock<Box<dyn PeerPicker>>,
    loads: Merger<String, Result<ByteView, Error>>,
    counters: Counters,
}

impl Group {
    pub(crate) fn new(name: String, getter: Arc<DynGetter<'static>>, store: Box<dyn Store>, peers: Option<Box<dyn PeerPicker>>) -> Self {
        Self {
            name,
            getter,
            store,
            peers: peers.map_or_else(OnceLock::new, OnceLock::from),
            loads: Merger::new(),
            counters: Counters::default(),
        }
    }

    /// Returns the name of the group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a snapshot of the group's activity counters.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.counters.snapshot()
    }

    /// Returns `true` once a peer picker is attached.
    #[must_use]
    pub fn has_peers(&self) -> bool {
        self.peers.get().is_some()
    }

    /// Attaches the peer picker used to route misses to remote peers.
    ///
    /// A group's topology is fixed once chosen, so this succeeds at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeersAlreadyRegistered`] if a picker is already attached.
    pub fn register_peers(&self, peers: impl PeerPicker + 'static) -> Result<(), ConfigError> {
        self.peers
            .set(Box::new(peers))
            .map_err(|_rejected| ConfigError::PeersAlreadyRegistered(self.name.clone()))?;
        tracing::debug!(group = %self.name, "registered peers");
        Ok(())
    }

    /// Returns the value for `key`.
    ///
    /// Values are served from the local store when present. Otherwise they are loaded once,
    /// no matter how many callers ask concurrently, from the owning peer or the getter.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyKey`] if `key` is empty; nothing is looked up or loaded.
    /// - [`Error::Getter`] if the value had to be loaded locally and the getter failed.
    /// - [`Error::Panicked`] if the getter or a peer panicked during the load.
    ///
    /// A failing peer is never reported; the group falls back to its getter instead.
    pub async fn get(&self, key: &str) -> Result<ByteView, Error> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        self.counters.gets.increment();

        if let Some(value) = self.store.get(key) {
            self.counters.cache_hits.increment();
            tracing::debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView, Error> {
        self.counters.loads.increment();
        self.loads
            .execute(key, || self.load_once(key))
            .await
            .unwrap_or_else(|panicked| Err(Error::from(panicked)))
    }

    async fn load_once(&self, key: &str) -> Result<ByteView, Error> {
        self.counters.loads_executed.increment();

        if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
            match self.get_from_peer(&peer, key).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    self.counters.peer_errors.increment();
                    tracing::warn!(group = %self.name, key, peer = peer.name(), %error, "failed to get from peer");
                }
            }
        }

        self.get_locally(key).await
    }

    // Values owned by a peer are not added to the local store.
    async fn get_from_peer(&self, peer: &Peer, key: &str) -> Result<ByteView, BoxError> {
        let request = FetchRequest::new(self.name.as_str(), key);
        let response = peer.get(&request).await?;
        self.counters.peer_loads.increment();
        tracing::debug!(group = %self.name, key, peer = peer.name(), "loaded from peer");
        Ok(ByteView::from(response.into_value()))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView, Error> {
        let bytes = self.getter.get(key).await.map_err(|error| {
            self.counters.local_load_errors.increment();
            Error::getter(error)
        })?;
        self.counters.local_loads.increment();
        tracing::debug!(group = %self.name, key, len = bytes.len(), "loaded locally");

        let value = ByteView::from(bytes);
        self.store.add(key, value.clone());
        Ok(value)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_peers", &self.has_peers())
            .field("loads", &self.loads)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Registry, getter_fn};

    static_assertions::assert_impl_all!(Group: Send, Sync, fmt::Debug);

    #[tokio::test]
    async fn empty_key_is_rejected_before_counting() {
        let registry = Registry::new();
        let group = registry
            .new_group("scores", 0, getter_fn(|_key: String| async { Ok::<_, BoxError>(Vec::new()) }))
            .expect("group should register");

        assert!(matches!(group.get("").await, Err(Error::EmptyKey)));
        assert_eq!(group.stats(), Stats::default());
    }

    #[tokio::test]
    async fn miss_is_loaded_by_the_getter_and_cached() {
        let registry = Registry::new();
        let group = registry
            .new_group("scores", 0, getter_fn(|key: String| async move { Ok::<_, BoxError>(key.into_bytes()) }))
            .expect("group should register");

        assert_eq!(group.get("Tom").await.expect("getter answers").as_string(), "Tom");
        assert_eq!(group.get("Tom").await.expect("store answers").as_string(), "Tom");

        let stats = group.stats();
        assert_eq!(stats.local_loads, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn get_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let registry = Registry::new();
        let group = registry
            .new_group("scores", 0, getter_fn(|_key: String| async { Ok::<_, BoxError>(Vec::new()) }))
            .expect("group should register");
        assert_send(&group.get("key"));
    }

    #[test]
    fn debug_lists_name_and_peers() {
        let registry = Registry::new();
        let group = registry
            .new_group("scores", 0, getter_fn(|_key: String| async { Ok::<_, BoxError>(Vec::new()) }))
            .expect("group should register");
        let debug_str = format!("{group:?}");
        assert!(debug_str.contains("scores"));
        assert!(debug_str.contains("has_peers: false"));
    }
}
