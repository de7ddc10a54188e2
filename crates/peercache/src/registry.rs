// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{ConfigError, Getter, Group, GroupBuilder};

/// A name-indexed collection of groups.
///
/// The registry is an ordinary value owned by the composition root; there is no
/// process-wide instance. Lookups take a shared lock and may run concurrently with each
/// other and with registrations.
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, Registry, getter_fn};
///
/// let registry = Registry::new();
/// registry.new_group("scores", 0, getter_fn(|key: String| async move { Ok::<_, BoxError>(key.into_bytes()) }))?;
///
/// assert!(registry.get_group("scores").is_some());
/// assert!(registry.get_group("unknown").is_none());
/// # Ok::<(), peercache::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts configuring a group called `name`.
    #[must_use]
    pub fn group(&self, name: impl Into<String>) -> GroupBuilder<'_> {
        GroupBuilder::new(self, name.into())
    }

    /// Creates and registers a group backed by an in-memory store of `capacity_bytes`.
    ///
    /// A `capacity_bytes` of zero means the store is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateGroup`] if a group called `name` already exists.
    pub fn new_group(&self, name: impl Into<String>, capacity_bytes: u64, getter: impl Getter + 'static) -> Result<Arc<Group>, ConfigError> {
        self.group(name).capacity_bytes(capacity_bytes).getter(getter).build()
    }

    /// Returns the group registered under `name`.
    #[must_use]
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Returns `true` if no group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Returns the names of all registered groups, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn register(&self, group: Group) -> Result<Arc<Group>, ConfigError> {
        match self.groups.write().entry(group.name().to_owned()) {
            Entry::Occupied(entry) => Err(ConfigError::DuplicateGroup(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(group = %entry.key(), "registered group");
                Ok(Arc::clone(entry.insert(Arc::new(group))))
            }
        }
    }
}
