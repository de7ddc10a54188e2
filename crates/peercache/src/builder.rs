// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for registering a [`Group`] with a [`Registry`].

use std::{fmt, sync::Arc};

use peercache_memory::MemoryStore;
use peercache_store::Store;

use crate::{ConfigError, Getter, Group, PeerPicker, Registry, getter::DynGetter};

/// Configures a group before it is registered.
///
/// Created by [`Registry::group`]. The getter is the only required setting; the store
/// defaults to a [`MemoryStore`] bounded by [`capacity_bytes`](Self::capacity_bytes).
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, Registry, getter_fn};
///
/// let registry = Registry::new();
/// let group = registry
///     .group("scores")
///     .capacity_bytes(64 << 20)
///     .getter(getter_fn(|key: String| async move { Ok::<_, BoxError>(key.into_bytes()) }))
///     .build()?;
///
/// assert_eq!(group.name(), "scores");
/// # Ok::<(), peercache::ConfigError>(())
/// ```
pub struct GroupBuilder<'a> {
    registry: &'a Registry,
    name: String,
    capacity_bytes: u64,
    getter: Option<Arc<DynGetter<'static>>>,
    store: Option<Box<dyn Store>>,
    peers: Option<Box<dyn PeerPicker>>,
}

impl<'a> GroupBuilder<'a> {
    pub(crate) fn new(registry: &'a Registry, name: String) -> Self {
        Self {
            registry,
            name,
            capacity_bytes: 0,
            getter: None,
            store: None,
            peers: None,
        }
    }

    /// Sets the byte budget of the default in-memory store. Zero, the default, means unbounded.
    ///
    /// Ignored when a custom store is supplied with [`store`](Self::store).
    #[must_use]
    pub fn capacity_bytes(mut self, capacity_bytes: u64) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Sets the getter used to load values that no peer serves.
    #[must_use]
    pub fn getter(mut self, getter: impl Getter + 'static) -> Self {
        self.getter = Some(DynGetter::new_arc(getter));
        self
    }

    /// Replaces the default in-memory store.
    #[must_use]
    pub fn store(mut self, store: impl Store + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Attaches a peer picker up front instead of calling [`Group::register_peers`] later.
    #[must_use]
    pub fn peers(mut self, peers: impl PeerPicker + 'static) -> Self {
        self.peers = Some(Box::new(peers));
        self
    }

    /// Builds the group and registers it under its name.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingGetter`] if no getter was set.
    /// - [`ConfigError::DuplicateGroup`] if the registry already holds a group with this name.
    pub fn build(self) -> Result<Arc<Group>, ConfigError> {
        let Some(getter) = self.getter else {
            return Err(ConfigError::MissingGetter(self.name));
        };

        let store: Box<dyn Store> = match self.store {
            Some(store) => store,
            None => Box::new(
                MemoryStore::builder()
                    .max_bytes(self.capacity_bytes)
                    .name(self.name.as_str())
                    .build(),
            ),
        };

        let group = Group::new(self.name, getter, store, self.peers);
        self.registry.register(group)
    }
}

impl fmt::Debug for GroupBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("name", &self.name)
            .field("capacity_bytes", &self.capacity_bytes)
            .field("has_getter", &self.getter.is_some())
            .field("has_store", &self.store.is_some())
            .field("has_peers", &self.peers.is_some())
            .finish_non_exhaustive()
    }
}
