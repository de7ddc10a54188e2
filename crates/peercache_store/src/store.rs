// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The local store abstraction consumed by cache groups.
//!
//! [`Store`] is the narrow contract a group needs from its local cache: look a key up and
//! add a loaded value. Eviction is entirely up to the implementation.

use std::sync::Arc;

use crate::ByteView;

/// A bounded, thread-safe key to [`ByteView`] store.
///
/// Implementations must be internally synchronized: a group calls them concurrently from
/// many tasks without any outer lock. Both operations are expected to be cheap and are
/// called without `.await`.
///
/// Size reporting is optional: the defaults return `None` for stores that don't track it.
pub trait Store: Send + Sync {
    /// Returns the value cached for `key`, if any.
    fn get(&self, key: &str) -> Option<ByteView>;

    /// Adds `value` under `key`, possibly evicting other entries.
    fn add(&self, key: &str, value: ByteView);

    /// Returns the number of entries, if supported.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store holds no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn get(&self, key: &str) -> Option<ByteView> {
        (**self).get(key)
    }

    fn add(&self, key: &str, value: ByteView) {
        (**self).add(key, value);
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}
