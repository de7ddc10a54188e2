// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The getter capability a group falls back to on a miss.

use std::fmt;

use crate::BoxError;

/// Loads the value for a key that is neither cached locally nor served by a peer.
///
/// A group calls its getter only on a true miss, and never more than once at a time for
/// the same key: concurrent misses share one call. Implement this trait for stateful data
/// sources, or adapt a plain closure with [`getter_fn`].
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, Getter};
/// use std::collections::HashMap;
///
/// struct Scores(HashMap<String, String>);
///
/// impl Getter for Scores {
///     async fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
///         self.0
///             .get(key)
///             .map(|score| score.clone().into_bytes())
///             .ok_or_else(|| format!("{key} does not exist").into())
///     }
/// }
/// ```
#[dynosaur::dynosaur(pub(crate) DynGetter = dyn(box) Getter, bridge(none))]
pub trait Getter: Send + Sync {
    /// Produces the bytes for `key`, or the reason they could not be produced.
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, BoxError>> + Send;
}

/// A [`Getter`] backed by a closure. Created by [`getter_fn`].
#[derive(Clone)]
pub struct GetterFn<F> {
    func: F,
}

impl<F> fmt::Debug for GetterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetterFn").finish_non_exhaustive()
    }
}

/// Adapts a closure into a [`Getter`].
///
/// The closure receives an owned copy of the key so the returned future can outlive the call.
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, getter_fn};
///
/// let getter = getter_fn(|key: String| async move {
///     Ok::<_, BoxError>(key.into_bytes())
/// });
/// ```
pub fn getter_fn<F, Fut>(func: F) -> GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>, BoxError>> + Send,
{
    GetterFn { func }
}

impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>, BoxError>> + Send,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, BoxError>> + Send {
        (self.func)(key.to_owned())
    }
}
