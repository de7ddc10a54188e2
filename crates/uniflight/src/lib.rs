// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coalesces duplicate async tasks into a single execution.
//!
//! This crate provides [`Merger`], a mechanism for deduplicating concurrent async operations.
//! When multiple tasks request the same work (identified by a key), only the first task (the
//! "leader") performs the actual work while subsequent tasks (the "followers") wait and receive
//! a clone of the result.
//!
//! # When to Use
//!
//! Use `Merger` when you have expensive or rate-limited operations that may be requested
//! concurrently with the same parameters:
//!
//! - **Cache population**: Prevent thundering herd when a cache entry is missing
//! - **Remote fetches**: Deduplicate concurrent requests to the same peer
//! - **Database queries**: Coalesce identical queries issued simultaneously
//!
//! # Example
//!
//! ```
//! use uniflight::Merger;
//!
//! # async fn example() {
//! let group: Merger<String, String> = Merger::new();
//!
//! // Multiple concurrent calls with the same key will share a single execution
//! let result = group
//!     .execute("user:123", || async {
//!         // This expensive operation runs only once, even if called concurrently
//!         "expensive_result".to_string()
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), "expensive_result");
//! # }
//! ```
//!
//! # Lifetime of a Call
//!
//! The leader runs the work on its own task; no task is spawned. Once the work finishes, the
//! in-flight record is removed *before* followers are released, so a call arriving after that
//! point starts a fresh execution. Nothing is memoized beyond the in-flight window.
//!
//! # Cancellation and Panic Safety
//!
//! - If the leader panics, the panic is caught and every attached caller receives
//!   [`LeaderPanicked`]. The in-flight record is still cleaned up.
//! - If the leader future is dropped before finishing, one of the followers becomes the new
//!   leader and executes its own work, so followers never wait forever.
//!
//! # Thread Safety
//!
//! [`Merger`] is `Send` and `Sync`, and can be shared across threads.

use std::{
    any::Any,
    borrow::Borrow,
    collections::HashMap,
    fmt,
    hash::Hash,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_once_cell::OnceCell;
use futures_util::FutureExt;
use parking_lot::Mutex;

type Mapping<K, T> = Mutex<HashMap<K, Arc<Call<T>>>>;

/// Error returned to every caller attached to a call whose leader panicked.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("leader panicked while executing shared work: {message}")]
pub struct LeaderPanicked {
    message: String,
}

impl LeaderPanicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_owned());
        Self { message }
    }

    /// Returns the panic message, when the panic payload was a string.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// In-flight record shared by every caller of one key.
struct Call<T> {
    outcome: OnceCell<Result<T, LeaderPanicked>>,
    attached: AtomicUsize,
}

impl<T> Call<T> {
    fn new() -> Self {
        Self {
            outcome: OnceCell::new(),
            attached: AtomicUsize::new(1),
        }
    }
}

/// Represents a class of work and creates a space in which units of work
/// can be executed with duplicate suppression.
pub struct Merger<K, T> {
    mapping: Mapping<K, T>,
}

impl<K, T> Default for Merger<K, T> {
    fn default() -> Self {
        Self {
            mapping: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> fmt::Debug for Merger<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merger").field("in_flight", &self.mapping.lock().len()).finish()
    }
}

/// Detaches a caller from its call when the caller's future completes or is dropped.
struct Attached<'a, K, T, Q>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    mapping: &'a Mapping<K, T>,
    key: &'a Q,
    call: &'a Arc<Call<T>>,
}

impl<K, T, Q> Drop for Attached<'_, K, T, Q>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    fn drop(&mut self) {
        // Decremented under the map lock so nobody attaches to a record we are about to drop.
        let mut mapping = self.mapping.lock();
        let remaining = self.call.attached.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 && self.call.outcome.get().is_none() {
            // Every caller gave up before the work finished.
            remove_if_current(&mut mapping, self.key, self.call);
        }
    }
}

fn remove_if_current<K, T, Q>(mapping: &mut HashMap<K, Arc<Call<T>>>, key: &Q, call: &Arc<Call<T>>)
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    if mapping.get(key).is_some_and(|current| Arc::ptr_eq(current, call)) {
        mapping.remove(key);
    }
}

impl<K, T> Merger<K, T>
where
    K: Hash + Eq,
{
    /// Creates a new, empty `Merger`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys that currently have work in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.mapping.lock().len()
    }

    /// Returns how many callers are attached to the in-flight work for `key`.
    ///
    /// The count includes the leader. Returns 0 when nothing is in flight for `key`.
    #[must_use]
    pub fn waiters<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mapping
            .lock()
            .get(key)
            .map_or(0, |call| call.attached.load(Ordering::Acquire))
    }

    /// Executes `func` for `key`, making sure only one execution per key is in flight.
    ///
    /// If work for the same key is already in flight, this call waits for it and returns a
    /// clone of its result instead of invoking `func`.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderPanicked`] if the execution this call was attached to panicked. Every
    /// caller attached to that execution receives the same error.
    ///
    /// # Example
    ///
    /// ```
    /// use uniflight::Merger;
    ///
    /// # async fn example() {
    /// let merger: Merger<String, u64> = Merger::new();
    /// let value = merger.execute("answer", || async { 42 }).await;
    /// assert_eq!(value, Ok(42));
    /// assert_eq!(merger.in_flight(), 0);
    /// # }
    /// ```
    pub async fn execute<Q, F, Fut>(&self, key: &Q, func: F) -> Result<T, LeaderPanicked>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
        T: Clone,
    {
        let call = self.attach(key);
        let _attached = Attached {
            mapping: &self.mapping,
            key,
            call: &call,
        };

        let mapping = &self.mapping;
        let leader_call = &call;
        call.outcome
            .get_or_init(async move {
                let outcome = AssertUnwindSafe(async move { func().await })
                    .catch_unwind()
                    .await
                    .map_err(LeaderPanicked::from_payload);

                // Drop the record before publishing so late callers start over.
                remove_if_current(&mut mapping.lock(), key, leader_call);
                outcome
            })
            .await
            .clone()
    }

    fn attach<Q>(&self, key: &Q) -> Arc<Call<T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let mut mapping = self.mapping.lock();
        if let Some(call) = mapping.get(key) {
            call.attached.fetch_add(1, Ordering::AcqRel);
            return Arc::clone(call);
        }

        let call = Arc::new(Call::new());
        mapping.insert(key.to_owned(), Arc::clone(&call));
        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_str_is_kept() {
        let panicked = LeaderPanicked::from_payload(Box::new("boom"));
        assert_eq!(panicked.message(), "boom");
    }

    #[test]
    fn payload_string_is_kept() {
        let panicked = LeaderPanicked::from_payload(Box::new("boom".to_string()));
        assert_eq!(panicked.message(), "boom");
        assert!(panicked.to_string().contains("boom"));
    }

    #[test]
    fn opaque_payload_has_placeholder_message() {
        let panicked = LeaderPanicked::from_payload(Box::new(7_u32));
        assert_eq!(panicked.message(), "opaque panic payload");
    }

    #[test]
    fn remove_if_current_keeps_newer_record() {
        let mut mapping: HashMap<String, Arc<Call<u32>>> = HashMap::new();
        let stale = Arc::new(Call::new());
        let current = Arc::new(Call::new());
        mapping.insert("key".to_string(), Arc::clone(&current));

        remove_if_current(&mut mapping, "key", &stale);
        assert!(mapping.contains_key("key"));

        remove_if_current(&mut mapping, "key", &current);
        assert!(mapping.is_empty());
    }

    static_assertions::assert_impl_all!(Merger<String, String>: Send, Sync);
}
